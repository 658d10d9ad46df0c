//! Shared-secret guard for the scheduler endpoint

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use sha2::{Digest, Sha256};

use super::session::bearer_token;
use crate::error::AppError;
use crate::AppState;

/// Compare two secrets through their SHA-256 digests so the comparison
/// always runs over the same number of bytes
fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// When `CRON_SECRET_TOKEN` is configured, require it as a bearer token.
/// Without it the endpoint is open.
pub async fn cron_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.cron_secret.as_deref() {
        let presented = bearer_token(&request).ok_or(AppError::Unauthorized)?;
        if !secrets_match(presented, expected) {
            tracing::warn!("Rejected status refresh with invalid token");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
