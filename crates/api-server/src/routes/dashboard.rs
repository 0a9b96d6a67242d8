use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use cm_core::dashboard::{DashboardStats, MonthKey};

use super::error::{map_core_error, query_rejection, RouteError};
use crate::{auth::resolve_tenant_context, state::AppState};

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    #[serde(default)]
    month: Option<String>,
}

async fn get_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardStats>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let Query(query) = query.map_err(query_rejection)?;
    let month = query
        .month
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(MonthKey::parse)
        .transpose()
        .map_err(map_core_error)?;

    let clients = state
        .service()
        .list_clients(ctx.tenant_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(DashboardStats::compute(&clients, Utc::now(), month)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}
