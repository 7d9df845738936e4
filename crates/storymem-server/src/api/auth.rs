//! Bearer token authentication

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use super::state::AppState;

/// Reject requests whose `Authorization: Bearer` token is not the shared key
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .is_some_and(|token| {
            !state.api_key.is_empty()
                && constant_time_eq(token.as_bytes(), state.api_key.as_bytes())
        });

    if !authorized {
        tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Token from an `Authorization` value; the scheme is matched case-insensitively
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
