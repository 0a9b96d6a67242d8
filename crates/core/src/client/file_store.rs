//! File-based client storage implementation
//!
//! Stores all tenants' clients as JSON in a single file on disk.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::Client;
use super::repository::ClientRepository;
use crate::persist::{load_snapshot, write_snapshot};
use crate::quota::{QuotaDecision, TenantQuota};
use crate::{Error, Result};

/// File-based client store using JSON
pub struct FileClientStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory copy of every persisted client
    cache: RwLock<HashMap<Uuid, Client>>,
}

impl FileClientStore {
    /// Create a new FileClientStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let clients: Vec<Client> = load_snapshot(&path).await?;
        let cache = clients.into_iter().map(|c| (c.id, c)).collect();

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Write `next` to disk; the caller swaps it in only on success.
    async fn persist(&self, next: &HashMap<Uuid, Client>) -> Result<()> {
        let mut clients: Vec<&Client> = next.values().collect();
        clients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        write_snapshot(&self.path, &clients).await
    }
}

fn email_taken(cache: &HashMap<Uuid, Client>, candidate: &Client) -> bool {
    cache.values().any(|existing| {
        existing.tenant_id == candidate.tenant_id
            && existing.id != candidate.id
            && existing.email.eq_ignore_ascii_case(&candidate.email)
    })
}

fn sorted_newest_first(mut clients: Vec<Client>) -> Vec<Client> {
    clients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    clients
}

#[async_trait]
impl ClientRepository for FileClientStore {
    async fn create_within_quota(&self, client: Client, quota: TenantQuota) -> Result<Client> {
        let mut cache = self.cache.write().await;

        let current = cache
            .values()
            .filter(|c| c.tenant_id == client.tenant_id)
            .count();
        if let QuotaDecision::Deny { reason } = quota.check(current) {
            return Err(Error::QuotaExceeded(reason));
        }

        if cache.contains_key(&client.id) {
            return Err(Error::Conflict(format!(
                "Client with ID {} already exists",
                client.id
            )));
        }
        if email_taken(&cache, &client) {
            return Err(Error::Conflict(format!(
                "A client with email '{}' already exists",
                client.email
            )));
        }

        let mut next = cache.clone();
        next.insert(client.id, client.clone());
        self.persist(&next).await?;
        *cache = next;
        Ok(client)
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Client>> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id)
            .cloned())
    }

    async fn list(&self, tenant_id: Uuid) -> Result<Vec<Client>> {
        let cache = self.cache.read().await;
        let clients = cache
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        Ok(sorted_newest_first(clients))
    }

    async fn update(&self, mut client: Client) -> Result<Client> {
        let mut cache = self.cache.write().await;

        let existing = cache
            .get(&client.id)
            .filter(|c| c.tenant_id == client.tenant_id)
            .ok_or_else(|| Error::NotFound(format!("Client {} not found", client.id)))?;
        // Ownership and creation metadata are fixed at insert time.
        client.created_by = existing.created_by;
        client.created_at = existing.created_at;
        client.updated_at = Utc::now();

        if email_taken(&cache, &client) {
            return Err(Error::Conflict(format!(
                "A client with email '{}' already exists",
                client.email
            )));
        }

        let mut next = cache.clone();
        next.insert(client.id, client.clone());
        self.persist(&next).await?;
        *cache = next;
        Ok(client)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool> {
        let mut cache = self.cache.write().await;
        if !cache.get(&id).is_some_and(|c| c.tenant_id == tenant_id) {
            return Ok(false);
        }

        let mut next = cache.clone();
        next.remove(&id);
        self.persist(&next).await?;
        *cache = next;
        Ok(true)
    }

    async fn count(&self, tenant_id: Uuid) -> Result<usize> {
        let cache = self.cache.read().await;
        Ok(cache.values().filter(|c| c.tenant_id == tenant_id).count())
    }
}
