//! Account module
//!
//! Tenants, users and first-login provisioning.

mod model;
mod store;

pub use model::*;
pub use store::{AccountStore, Provisioned};
