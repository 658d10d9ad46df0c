//! Merchant session middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::domain::entities::Merchant;
use crate::error::{AppError, AppwriteError};
use crate::AppState;

/// Extract the bearer token from the Authorization header
pub(crate) fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware for the dashboard API
///
/// Resolves the Appwrite JWT to its account and injects the `Merchant`
/// into request extensions.
pub async fn merchant_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let jwt = bearer_token(&request).ok_or(AppError::Unauthorized)?;

    let account = state.accounts.get_account(jwt).await.map_err(|e| match e {
        AppwriteError::Unauthorized | AppwriteError::NotFound(_) => AppError::Unauthorized,
        AppwriteError::Api { status: 401, .. } => AppError::Unauthorized,
        other => AppError::Appwrite(other),
    })?;

    let merchant = Merchant::from(account);
    tracing::debug!(merchant_id = %merchant.id, "Merchant authenticated");
    request.extensions_mut().insert(merchant);

    Ok(next.run(request).await)
}
