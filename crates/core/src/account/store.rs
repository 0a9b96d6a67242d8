//! File-backed tenant and user store

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Tenant, User, UserRole, VerifiedIdentity};
use crate::error::Error;
use crate::persist::{load_snapshot, write_snapshot};
use crate::Result;

const DEFAULT_TENANT_NAME: &str = "New Company";

/// Result of resolving an identity into a local user and tenant.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub user: User,
    pub tenant: Tenant,
    /// True when this call created the tenant and user.
    pub created: bool,
}

#[derive(Debug, Clone, Default)]
struct AccountState {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, User>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredAccountState {
    #[serde(default)]
    tenants: Vec<Tenant>,
    #[serde(default)]
    users: Vec<User>,
}

impl From<StoredAccountState> for AccountState {
    fn from(value: StoredAccountState) -> Self {
        Self {
            tenants: value.tenants.into_iter().map(|t| (t.id, t)).collect(),
            users: value.users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

impl From<&AccountState> for StoredAccountState {
    fn from(value: &AccountState) -> Self {
        let mut tenants: Vec<Tenant> = value.tenants.values().cloned().collect();
        tenants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let mut users: Vec<User> = value.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Self { tenants, users }
    }
}

#[derive(Clone)]
pub struct AccountStore {
    state: Arc<RwLock<AccountState>>,
    file_path: PathBuf,
}

impl AccountStore {
    pub async fn new(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        let stored: StoredAccountState = load_snapshot(&file_path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(stored.into())),
            file_path,
        })
    }

    /// Map a verified identity onto a local user, creating a `STARTER`
    /// tenant and an admin user on first login. Refuses inactive tenants.
    pub async fn provision(&self, identity: &VerifiedIdentity) -> Result<Provisioned> {
        let email = normalize_identity_email(&identity.email)?;

        let mut state = self.state.write().await;
        if let Some(user) = state.users.values().find(|u| u.email == email).cloned() {
            let tenant = state
                .tenants
                .get(&user.tenant_id)
                .cloned()
                .ok_or_else(|| Error::Unauthorized("User has no tenant".to_string()))?;
            ensure_active(&tenant)?;
            return Ok(Provisioned {
                user,
                tenant,
                created: false,
            });
        }

        let display_name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let tenant = Tenant::new(display_name.unwrap_or(DEFAULT_TENANT_NAME), email.clone());
        let mut user = User::new(email, tenant.id, UserRole::TenantAdmin);
        user.name = display_name.map(str::to_string);
        user.image = identity.image.clone();

        let mut next = state.clone();
        next.tenants.insert(tenant.id, tenant.clone());
        next.users.insert(user.id, user.clone());
        write_snapshot(&self.file_path, &StoredAccountState::from(&next)).await?;
        *state = next;

        tracing::info!(
            tenant_id = %tenant.id,
            user_id = %user.id,
            "Provisioned tenant on first login"
        );
        Ok(Provisioned {
            user,
            tenant,
            created: true,
        })
    }

    /// Register a pre-built tenant together with its first user.
    pub async fn insert_tenant_with_user(&self, tenant: Tenant, user: User) -> Result<Provisioned> {
        if user.tenant_id != tenant.id {
            return Err(Error::Validation(
                "User must belong to the inserted tenant".to_string(),
            ));
        }
        let mut tenant = tenant;
        tenant.email = tenant.email.trim().to_lowercase();
        let mut user = user;
        user.email = normalize_identity_email(&user.email)?;

        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!(
                "User '{}' already exists",
                user.email
            )));
        }
        if state.tenants.contains_key(&tenant.id) {
            return Err(Error::Conflict(format!(
                "Tenant {} already exists",
                tenant.id
            )));
        }

        let mut next = state.clone();
        next.tenants.insert(tenant.id, tenant.clone());
        next.users.insert(user.id, user.clone());
        write_snapshot(&self.file_path, &StoredAccountState::from(&next)).await?;
        *state = next;

        Ok(Provisioned {
            user,
            tenant,
            created: true,
        })
    }

    pub async fn get_tenant(&self, id: Uuid) -> Option<Tenant> {
        self.state.read().await.tenants.get(&id).cloned()
    }

    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        self.state.read().await.users.get(&id).cloned()
    }

    pub async fn find_tenant_by_email(&self, email: &str) -> Option<Tenant> {
        let email = email.trim().to_lowercase();
        self.state
            .read()
            .await
            .tenants
            .values()
            .find(|tenant| tenant.email == email)
            .cloned()
    }
}

fn ensure_active(tenant: &Tenant) -> Result<()> {
    if tenant.is_active {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!(
            "Tenant {} is inactive",
            tenant.id
        )))
    }
}

fn normalize_identity_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::Unauthorized(
            "Identity does not carry a usable email".to_string(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::TenantPlan;
    use tempfile::TempDir;

    async fn build_store() -> (AccountStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = AccountStore::new(temp_dir.path().join("accounts.json"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn identity(email: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            email: email.to_string(),
            name: Some("Dana Owner".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn first_login_provisions_starter_tenant() {
        let (store, _temp) = build_store().await;

        let provisioned = store.provision(&identity("Dana@Example.com")).await.unwrap();
        assert!(provisioned.created);
        assert_eq!(provisioned.tenant.plan, TenantPlan::Starter);
        assert_eq!(provisioned.tenant.name, "Dana Owner");
        assert_eq!(provisioned.user.email, "dana@example.com");
        assert_eq!(provisioned.user.role, UserRole::TenantAdmin);
        assert_eq!(provisioned.user.tenant_id, provisioned.tenant.id);
    }

    #[tokio::test]
    async fn repeat_login_reuses_user_and_tenant() {
        let (store, _temp) = build_store().await;

        let first = store.provision(&identity("dana@example.com")).await.unwrap();
        let second = store.provision(&identity("dana@example.com")).await.unwrap();
        assert!(!second.created);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.tenant.id, second.tenant.id);
    }

    #[tokio::test]
    async fn identity_without_email_is_refused() {
        let (store, _temp) = build_store().await;
        let result = store.provision(&identity("  ")).await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn inactive_tenant_cannot_sign_in() {
        let (store, _temp) = build_store().await;
        let mut tenant = Tenant::new("Dormant", "dormant@example.com");
        tenant.is_active = false;
        let user = User::new("member@example.com", tenant.id, UserRole::TenantUser);
        store.insert_tenant_with_user(tenant, user).await.unwrap();

        let result = store.provision(&identity("member@example.com")).await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn accounts_survive_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");

        let provisioned = {
            let store = AccountStore::new(&path).await.unwrap();
            store.provision(&identity("dana@example.com")).await.unwrap()
        };

        let store = AccountStore::new(&path).await.unwrap();
        let tenant = store.get_tenant(provisioned.tenant.id).await.unwrap();
        assert_eq!(tenant.email, "dana@example.com");
        assert!(store.get_user(provisioned.user.id).await.is_some());
        assert!(store.find_tenant_by_email("DANA@example.com").await.is_some());
    }

    #[tokio::test]
    async fn duplicate_user_email_is_a_conflict() {
        let (store, _temp) = build_store().await;
        store.provision(&identity("dana@example.com")).await.unwrap();

        let tenant = Tenant::new("Other", "other@example.com");
        let user = User::new("dana@example.com", tenant.id, UserRole::TenantAdmin);
        let result = store.insert_tenant_with_user(tenant, user).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }
}
