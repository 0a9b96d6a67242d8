use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cm_core::client::{Client, ClientDraft, ClientStatus, Server, DEFAULT_EXPIRING_THRESHOLD_DAYS};
use cm_core::subscription::{days_remaining, ClientPlan, UrgencyBucket};
use cm_core::Error;

use super::error::{bad_request, json_rejection, map_core_error, query_rejection, RouteError};
use super::format_instant;
use crate::{auth::resolve_tenant_context, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    id: String,
    tenant_id: String,
    name: String,
    email: String,
    server: Server,
    plan: ClientPlan,
    status: ClientStatus,
    start_date: String,
    expiration_date: String,
    created_by: String,
    created_at: String,
    updated_at: String,
    days_remaining: i64,
    urgency: UrgencyBucket,
}

impl ClientResponse {
    fn from_client(client: Client, now: DateTime<Utc>) -> Self {
        let days = days_remaining(client.expiration_date, now);
        Self {
            id: client.id.to_string(),
            tenant_id: client.tenant_id.to_string(),
            name: client.name,
            email: client.email,
            server: client.server,
            plan: client.plan,
            status: client.status,
            start_date: client.start_date.format("%Y-%m-%d").to_string(),
            expiration_date: client.expiration_date.format("%Y-%m-%d").to_string(),
            created_by: client.created_by.to_string(),
            created_at: format_instant(client.created_at),
            updated_at: format_instant(client.updated_at),
            days_remaining: days,
            urgency: UrgencyBucket::from_days_remaining(days),
        }
    }

    fn list(clients: Vec<Client>) -> Vec<Self> {
        let now = Utc::now();
        clients
            .into_iter()
            .map(|client| Self::from_client(client, now))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpiringQuery {
    #[serde(default)]
    threshold_days: Option<i64>,
}

fn parse_client_id(raw: &str) -> Result<Uuid, RouteError> {
    Uuid::parse_str(raw)
        .map_err(|_| map_core_error(Error::NotFound(format!("Client {} not found", raw))))
}

async fn list_clients(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClientResponse>>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let clients = state
        .service()
        .list_clients(ctx.tenant_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(ClientResponse::list(clients)))
}

async fn create_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ClientDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientResponse>), RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let Json(draft) = payload.map_err(json_rejection)?;
    tracing::debug!(tenant_id = %ctx.tenant_id, plan = %ctx.plan, role = %ctx.role, "Creating client");

    let client = state
        .service()
        .create_client(ctx.tenant_id, ctx.user_id, &draft)
        .await
        .map_err(map_core_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ClientResponse::from_client(client, Utc::now())),
    ))
}

async fn list_expiring_clients(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExpiringQuery>, QueryRejection>,
) -> Result<Json<Vec<ClientResponse>>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let Query(query) = query.map_err(query_rejection)?;
    let threshold = query
        .threshold_days
        .unwrap_or(DEFAULT_EXPIRING_THRESHOLD_DAYS);
    if threshold < 0 {
        return Err(bad_request("thresholdDays must not be negative"));
    }

    let clients = state
        .service()
        .list_expiring_clients(ctx.tenant_id, Utc::now(), threshold)
        .await
        .map_err(map_core_error)?;
    Ok(Json(ClientResponse::list(clients)))
}

async fn get_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ClientResponse>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let client_id = parse_client_id(&id)?;

    let client = state
        .service()
        .get_client(ctx.tenant_id, client_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(ClientResponse::from_client(client, Utc::now())))
}

async fn update_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ClientDraft>, JsonRejection>,
) -> Result<Json<ClientResponse>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let client_id = parse_client_id(&id)?;
    let Json(draft) = payload.map_err(json_rejection)?;

    let client = state
        .service()
        .update_client(ctx.tenant_id, client_id, &draft)
        .await
        .map_err(map_core_error)?;
    Ok(Json(ClientResponse::from_client(client, Utc::now())))
}

async fn delete_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;
    let client_id = parse_client_id(&id)?;

    state
        .service()
        .delete_client(ctx.tenant_id, client_id)
        .await
        .map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients).post(create_client))
        .route("/api/clients/expiring", get(list_expiring_clients))
        .route(
            "/api/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}
