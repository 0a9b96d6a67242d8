//! Demo data for local development.

use cm_core::account::{Tenant, TenantPlan, User, UserRole};
use cm_core::client::{ClientDraft, ClientService};
use cm_core::Result;

pub const DEMO_EMAIL: &str = "demo@example.com";

const DEMO_CLIENTS: [(&str, &str, &str, &str, &str, &str); 5] = [
    ("Joao Silva", "joao@example.com", "UNITV", "MONTHLY", "2024-01-15", "ACTIVE"),
    ("Maria Santos", "maria@example.com", "STRONG", "ANNUAL", "2023-12-01", "ACTIVE"),
    ("Pedro Costa", "pedro@example.com", "UNITV", "MONTHLY", "2024-01-01", "ACTIVE"),
    ("Ana Oliveira", "ana@example.com", "LION", "ANNUAL", "2023-11-15", "ACTIVE"),
    ("Carlos Ferreira", "carlos@example.com", "STRONG", "MONTHLY", "2024-02-01", "INACTIVE"),
];

/// Create the demo tenant, its admin and sample clients. Does nothing when the
/// demo tenant already exists. Returns whether anything was created.
pub async fn seed_demo(service: &ClientService) -> Result<bool> {
    if service.accounts().find_tenant_by_email(DEMO_EMAIL).await.is_some() {
        tracing::debug!("Demo tenant already present, skipping seed");
        return Ok(false);
    }

    let tenant = Tenant::new("Demo Company", DEMO_EMAIL)
        .with_company("Demo Company Ltd")
        .with_plan(TenantPlan::Professional)
        .with_max_clients(200);
    let user = User::new(DEMO_EMAIL, tenant.id, UserRole::TenantAdmin).with_name("Demo User");
    let provisioned = service.accounts().insert_tenant_with_user(tenant, user).await?;

    for (name, email, server, plan, start_date, status) in DEMO_CLIENTS {
        let draft = ClientDraft {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            server: Some(server.to_string()),
            plan: Some(plan.to_string()),
            start_date: Some(start_date.to_string()),
            status: Some(status.to_string()),
        };
        service
            .create_client(provisioned.tenant.id, provisioned.user.id, &draft)
            .await?;
    }

    tracing::info!(tenant_id = %provisioned.tenant.id, "Seeded demo tenant with {} clients", DEMO_CLIENTS.len());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::build_state;

    #[tokio::test]
    async fn seeds_once() {
        let (state, _tmp) = build_state().await;

        assert!(seed_demo(state.service()).await.unwrap());
        assert!(!seed_demo(state.service()).await.unwrap());

        let tenant = state.accounts().find_tenant_by_email(DEMO_EMAIL).await.unwrap();
        assert_eq!(tenant.plan, TenantPlan::Professional);
        assert_eq!(tenant.max_clients, Some(200));

        let clients = state.service().list_clients(tenant.id).await.unwrap();
        assert_eq!(clients.len(), 5);
        assert_eq!(clients.iter().filter(|c| !c.is_active()).count(), 1);
    }
}
