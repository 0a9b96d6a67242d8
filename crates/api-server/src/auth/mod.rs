//! Session tokens and tenant-context resolution.

mod context;
mod jwt;

pub use context::resolve_tenant_context;
pub use jwt::TokenService;
