//! Tenant and user model definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quota::TenantQuota;

/// Subscription tier of a tenant, governing its client ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantPlan {
    Starter,
    Professional,
    Enterprise,
}

impl Default for TenantPlan {
    fn default() -> Self {
        Self::Starter
    }
}

impl TenantPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "STARTER",
            Self::Professional => "PROFESSIONAL",
            Self::Enterprise => "ENTERPRISE",
        }
    }
}

impl fmt::Display for TenantPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    TenantAdmin,
    TenantUser,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::TenantUser => "TENANT_USER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billing/organization unit. All client data is partitioned by tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub plan: TenantPlan,
    /// Client ceiling override. Ignored for `STARTER`.
    #[serde(default)]
    pub max_clients: Option<u32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            company: "Starter Company".to_string(),
            plan: TenantPlan::default(),
            max_clients: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_plan(mut self, plan: TenantPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_max_clients(mut self, max_clients: u32) -> Self {
        self.max_clients = Some(max_clients);
        self
    }

    pub fn quota(&self) -> TenantQuota {
        TenantQuota::new(self.plan, self.max_clients)
    }
}

/// An authenticated principal belonging to exactly one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, tenant_id: Uuid, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: None,
            image: None,
            role,
            tenant_id,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Profile handed over by the identity provider after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tenant_defaults_to_active_starter() {
        let tenant = Tenant::new("Acme", "owner@acme.test");
        assert_eq!(tenant.plan, TenantPlan::Starter);
        assert!(tenant.is_active);
        assert!(tenant.max_clients.is_none());
        assert_eq!(tenant.quota().limit(), 20);
    }

    #[test]
    fn plan_and_role_use_screaming_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(TenantPlan::Professional).unwrap(),
            "PROFESSIONAL"
        );
        assert_eq!(
            serde_json::to_value(UserRole::TenantAdmin).unwrap(),
            "TENANT_ADMIN"
        );
    }
}
