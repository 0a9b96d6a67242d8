use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use cm_core::account::{User, UserRole, VerifiedIdentity};
use cm_core::Error;

use super::error::{json_rejection, map_core_error, route_error, RouteError};
use super::format_instant;
use super::tenant::TenantResponse;
use crate::{auth::resolve_tenant_context, state::AppState};

const CALLBACK_SECRET_HEADER: &str = "x-callback-secret";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    id: String,
    email: String,
    name: Option<String>,
    image: Option<String>,
    role: UserRole,
    tenant_id: String,
    created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            image: user.image,
            role: user.role,
            tenant_id: user.tenant_id.to_string(),
            created_at: format_instant(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    token: String,
    expires_at: String,
    created: bool,
    user: UserResponse,
    tenant: TenantResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user: UserResponse,
    tenant: TenantResponse,
}

fn check_callback_secret(state: &AppState, headers: &HeaderMap) -> Result<(), RouteError> {
    let expected = state
        .callback_secret()
        .ok_or_else(|| route_error(StatusCode::FORBIDDEN, "Sign-in callback is disabled"))?;
    let provided = headers
        .get(CALLBACK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    if provided == Some(expected) {
        Ok(())
    } else {
        tracing::warn!("Rejected sign-in callback with a missing or wrong secret");
        Err(route_error(StatusCode::UNAUTHORIZED, "Invalid callback secret"))
    }
}

async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VerifiedIdentity>, JsonRejection>,
) -> Result<Json<SignInResponse>, RouteError> {
    check_callback_secret(&state, &headers)?;
    let Json(identity) = payload.map_err(json_rejection)?;

    let provisioned = state
        .accounts()
        .provision(&identity)
        .await
        .map_err(map_core_error)?;
    let issued = state
        .tokens()
        .issue(&provisioned.user, &provisioned.tenant)
        .map_err(map_core_error)?;

    Ok(Json(SignInResponse {
        token: issued.token,
        expires_at: format_instant(issued.expires_at),
        created: provisioned.created,
        user: provisioned.user.into(),
        tenant: provisioned.tenant.into(),
    }))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, RouteError> {
    let ctx = resolve_tenant_context(&state, &headers)
        .await
        .map_err(map_core_error)?;

    let user = state
        .accounts()
        .get_user(ctx.user_id)
        .await
        .ok_or_else(|| map_core_error(Error::Unauthorized("User no longer exists".to_string())))?;
    let tenant = state
        .accounts()
        .get_tenant(ctx.tenant_id)
        .await
        .filter(|tenant| tenant.is_active)
        .ok_or_else(|| map_core_error(Error::Unauthorized("Tenant is not active".to_string())))?;

    Ok(Json(MeResponse {
        user: user.into(),
        tenant: tenant.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/me", get(me))
}
