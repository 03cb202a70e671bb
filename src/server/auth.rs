//! Shared-secret authentication for the protected routes.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use super::AppState;

#[derive(Deserialize)]
pub struct AuthParams {
    key: Option<String>,
}

/// Reject requests whose `key` query parameter does not match the
/// configured API key.
pub async fn require_key(
    State(state): State<AppState>,
    Query(params): Query<AuthParams>,
    request: Request,
    next: Next,
) -> Response {
    if key_matches(params.key.as_deref(), &state.api_key) {
        next.run(request).await
    } else {
        debug!("Rejected {} with missing or wrong key", request.uri().path());
        StatusCode::UNAUTHORIZED.into_response()
    }
}

fn key_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|key| key == expected)
}
