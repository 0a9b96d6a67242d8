//! Client repository trait
//!
//! Defines the tenant-scoped interface for client storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Client;
use crate::quota::TenantQuota;
use crate::Result;

/// Repository interface for client CRUD operations.
///
/// Every lookup is keyed by tenant; a record owned by another tenant is
/// indistinguishable from a missing one.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert `client` if its tenant is below `quota` and no other client of
    /// the tenant uses the same email. Count, checks and insert happen as
    /// one step with respect to other writers.
    async fn create_within_quota(&self, client: Client, quota: TenantQuota) -> Result<Client>;

    /// Get a client by ID within a tenant
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Client>>;

    /// All clients of a tenant, newest first
    async fn list(&self, tenant_id: Uuid) -> Result<Vec<Client>>;

    /// Replace an existing client of `client.tenant_id`, bumping `updated_at`
    async fn update(&self, client: Client) -> Result<Client>;

    /// Delete a client by ID within a tenant
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool>;

    /// Number of clients owned by a tenant
    async fn count(&self, tenant_id: Uuid) -> Result<usize>;
}
