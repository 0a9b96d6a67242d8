//! Route handlers

pub mod auth;
pub mod clients;
pub mod dashboard;
mod error;
pub mod health;
pub mod tenant;

use axum::Router;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::state::AppState;

/// Instants go out as RFC 3339 UTC with millisecond precision.
pub(crate) fn format_instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Every REST route, before state is attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(tenant::router())
        .merge(clients::router())
        .merge(dashboard::router())
}
