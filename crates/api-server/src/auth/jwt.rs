use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use cm_core::account::{Tenant, TenantPlan, User, UserRole};
use cm_core::Error;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub sub: String,
    pub tenant_id: String,
    pub role: UserRole,
    pub plan: TenantPlan,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl_seconds: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn issue(&self, user: &User, tenant: &Tenant) -> Result<IssuedToken, Error> {
        let expires_at = TimeDelta::try_seconds(self.ttl_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| Error::Storage("Token lifetime is out of range".to_string()))?;
        let exp = usize::try_from(expires_at.timestamp())
            .map_err(|_| Error::Storage("Failed to encode token expiration".to_string()))?;
        let claims = SessionClaims {
            sub: user.id.to_string(),
            tenant_id: tenant.id.to_string(),
            role: user.role,
            plan: tenant.plan,
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map(|token| IssuedToken { token, expires_at })
        .map_err(|err| Error::Storage(format!("Failed to sign session token: {}", err)))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|decoded| decoded.claims)
        .map_err(|err| Error::Unauthorized(format!("Invalid token: {}", err)))
    }
}
