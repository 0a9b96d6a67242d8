use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type RouteError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub(crate) fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

/// Map a domain error onto its HTTP status. Internal failures are logged and
/// reported without detail.
pub(crate) fn map_core_error(err: cm_core::Error) -> RouteError {
    use cm_core::Error;

    match err {
        Error::Unauthorized(msg) => route_error(StatusCode::UNAUTHORIZED, msg),
        Error::Validation(msg) => bad_request(msg),
        Error::QuotaExceeded(msg) => route_error(StatusCode::FORBIDDEN, msg),
        Error::NotFound(msg) => route_error(StatusCode::NOT_FOUND, msg),
        Error::Conflict(msg) => route_error(StatusCode::CONFLICT, msg),
        other => {
            tracing::error!(error = %other, "Request failed");
            route_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> RouteError {
    bad_request(rejection.body_text())
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> RouteError {
    bad_request(rejection.body_text())
}
