//! Client lifecycle orchestration
//!
//! Ties the subscription calculator and the quota guard to the account and
//! client stores. Every operation is scoped to the caller's tenant.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Client, ClientDraft};
use super::repository::ClientRepository;
use crate::account::AccountStore;
use crate::quota::QuotaUsage;
use crate::subscription::days_remaining;
use crate::{Error, Result};

/// Default look-ahead for the expiring-clients view.
pub const DEFAULT_EXPIRING_THRESHOLD_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ClientService {
    accounts: AccountStore,
    clients: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(accounts: AccountStore, clients: Arc<dyn ClientRepository>) -> Self {
        Self { accounts, clients }
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub async fn create_client(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        draft: &ClientDraft,
    ) -> Result<Client> {
        let tenant = self
            .accounts
            .get_tenant(tenant_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("Tenant {} not found", tenant_id)))?;
        let fields = draft.validate()?;

        let client = Client::new(tenant_id, user_id, fields);
        let created = self
            .clients
            .create_within_quota(client, tenant.quota())
            .await
            .inspect_err(|err| {
                if let Error::QuotaExceeded(reason) = err {
                    tracing::warn!(%tenant_id, plan = %tenant.plan, "Client creation denied: {}", reason);
                }
            })?;

        tracing::info!(
            %tenant_id,
            client_id = %created.id,
            plan = %created.plan,
            expiration = %created.expiration_date,
            "Client created"
        );
        Ok(created)
    }

    pub async fn get_client(&self, tenant_id: Uuid, client_id: Uuid) -> Result<Client> {
        self.clients
            .get(tenant_id, client_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Client {} not found", client_id)))
    }

    /// Replace all mutable fields of a client and re-derive its expiration.
    pub async fn update_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        draft: &ClientDraft,
    ) -> Result<Client> {
        let mut client = self.get_client(tenant_id, client_id).await?;
        let fields = draft.validate()?;
        client.apply(fields);

        let updated = self.clients.update(client).await?;
        tracing::debug!(%tenant_id, %client_id, expiration = %updated.expiration_date, "Client updated");
        Ok(updated)
    }

    pub async fn delete_client(&self, tenant_id: Uuid, client_id: Uuid) -> Result<()> {
        if self.clients.delete(tenant_id, client_id).await? {
            tracing::info!(%tenant_id, %client_id, "Client deleted");
            Ok(())
        } else {
            Err(Error::NotFound(format!("Client {} not found", client_id)))
        }
    }

    pub async fn list_clients(&self, tenant_id: Uuid) -> Result<Vec<Client>> {
        self.clients.list(tenant_id).await
    }

    /// Active clients whose expiration is at most `threshold_days` away,
    /// overdue ones included.
    pub async fn list_expiring_clients(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
        threshold_days: i64,
    ) -> Result<Vec<Client>> {
        let clients = self.clients.list(tenant_id).await?;
        Ok(clients
            .into_iter()
            .filter(|c| c.is_active() && days_remaining(c.expiration_date, now) <= threshold_days)
            .collect())
    }

    pub async fn quota_usage(&self, tenant_id: Uuid) -> Result<QuotaUsage> {
        let tenant = self
            .accounts
            .get_tenant(tenant_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("Tenant {} not found", tenant_id)))?;
        let count = self.clients.count(tenant_id).await?;
        Ok(QuotaUsage::new(tenant.quota(), count))
    }
}
