use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use cm_core::account::{TenantPlan, UserRole};
use cm_core::Error;

use crate::state::AppState;

/// The authenticated caller. Every data operation is scoped by `tenant_id`.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub plan: TenantPlan,
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;
    let auth_value = auth_header
        .to_str()
        .map_err(|_| Error::Unauthorized("Invalid Authorization header".to_string()))?;
    auth_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized("Authorization must be Bearer token".to_string()))
}

/// Resolve the caller's tenant context from a `Bearer` session token. The
/// user must still exist and its tenant must still be active; role and plan
/// come from the account store rather than the token.
pub async fn resolve_tenant_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<TenantContext, Error> {
    let token = extract_bearer_token(headers)?;
    let claims = state.tokens().verify(token)?;

    let parse = |raw: &str, what: &str| {
        Uuid::parse_str(raw).map_err(|_| Error::Unauthorized(format!("Token has an invalid {}", what)))
    };
    let tenant_id = parse(&claims.tenant_id, "tenant id")?;
    let user_id = parse(&claims.sub, "subject")?;

    let user = state
        .accounts()
        .get_user(user_id)
        .await
        .filter(|user| user.tenant_id == tenant_id)
        .ok_or_else(|| Error::Unauthorized("User no longer exists".to_string()))?;
    let tenant = state
        .accounts()
        .get_tenant(tenant_id)
        .await
        .filter(|tenant| tenant.is_active)
        .ok_or_else(|| {
            tracing::debug!(%tenant_id, "Rejected token for missing or inactive tenant");
            Error::Unauthorized("Tenant is not active".to_string())
        })?;

    Ok(TenantContext {
        tenant_id,
        user_id,
        role: user.role,
        plan: tenant.plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use cm_core::account::{Tenant, User};

    use crate::routes::test_support::build_state;

    async fn headers_for(state: &AppState, user: &User, tenant: &Tenant) -> HeaderMap {
        let token = state.tokens().issue(user, tenant).unwrap().token;
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn resolves_context_for_active_tenant() {
        let (state, _tmp) = build_state().await;
        let tenant = Tenant::new("Acme", "owner@acme.test").with_plan(TenantPlan::Professional);
        let user = User::new("owner@acme.test", tenant.id, UserRole::TenantAdmin);
        let provisioned = state
            .accounts()
            .insert_tenant_with_user(tenant, user)
            .await
            .unwrap();

        let headers = headers_for(&state, &provisioned.user, &provisioned.tenant).await;
        let ctx = resolve_tenant_context(&state, &headers).await.unwrap();
        assert_eq!(ctx.tenant_id, provisioned.tenant.id);
        assert_eq!(ctx.user_id, provisioned.user.id);
        assert_eq!(ctx.plan, TenantPlan::Professional);
    }

    #[tokio::test]
    async fn inactive_tenant_or_unknown_user_is_unauthorized() {
        let (state, _tmp) = build_state().await;

        let mut tenant = Tenant::new("Dormant", "owner@dormant.test");
        tenant.is_active = false;
        let user = User::new("owner@dormant.test", tenant.id, UserRole::TenantAdmin);
        let provisioned = state
            .accounts()
            .insert_tenant_with_user(tenant, user)
            .await
            .unwrap();
        let headers = headers_for(&state, &provisioned.user, &provisioned.tenant).await;
        assert!(matches!(
            resolve_tenant_context(&state, &headers).await,
            Err(Error::Unauthorized(_))
        ));

        let ghost_tenant = Tenant::new("Ghost", "ghost@example.test");
        let ghost = User::new("ghost@example.test", ghost_tenant.id, UserRole::TenantUser);
        let headers = headers_for(&state, &ghost, &ghost_tenant).await;
        assert!(matches!(
            resolve_tenant_context(&state, &headers).await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer secret-token"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "secret-token");
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_bearer_token(&headers), Err(Error::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic secret-token"));
        assert!(matches!(extract_bearer_token(&headers), Err(Error::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
