use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde::Serialize;

use cm_core::account::{Tenant, TenantPlan};
use cm_core::quota::QuotaUsage;

use super::error::{map_core_error, RouteError};
use super::format_instant;
use crate::{auth::resolve_tenant_context, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    id: String,
    name: String,
    email: String,
    company: String,
    plan: TenantPlan,
    max_clients: Option<u32>,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

impl From<Tenant> for TenantResponse {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id.to_string(),
            name: tenant.name,
            email: tenant.email,
            company: tenant.company,
            plan: tenant.plan,
            max_clients: tenant.max_clients,
            is_active: tenant.is_active,
            created_at: format_instant(tenant.created_at),
            updated_at: format_instant(tenant.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TenantOverview {
    tenant: TenantResponse,
    usage: QuotaUsage,
}

async fn get_tenant(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TenantOverview>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;

    let tenant = state
        .accounts()
        .get_tenant(ctx.tenant_id)
        .await
        .ok_or_else(|| {
            map_core_error(cm_core::Error::NotFound(format!(
                "Tenant {} not found",
                ctx.tenant_id
            )))
        })?;
    let usage = state
        .service()
        .quota_usage(ctx.tenant_id)
        .await
        .map_err(map_core_error)?;

    Ok(Json(TenantOverview {
        tenant: tenant.into(),
        usage,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tenant", get(get_tenant))
}
