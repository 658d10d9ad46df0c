//! Unified error types for the Krato API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic errors
//! - `AppwriteError`: Appwrite REST client errors
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)
//! - `ConfigError`: Environment configuration errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Appwrite API client errors
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Unauthorized - invalid credentials")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<AppwriteError> for DomainError {
    fn from(e: AppwriteError) -> Self {
        match e {
            AppwriteError::NotFound(msg) => DomainError::NotFound(msg),
            e => DomainError::Database(e.to_string()),
        }
    }
}

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Appwrite error: {0}")]
    Appwrite(#[from] AppwriteError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "Already exists", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "Conflict", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(msg.clone()),
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(msg.clone()),
                )
            }
            AppError::Appwrite(e) => {
                tracing::error!("Appwrite error: {}", e);
                match e {
                    AppwriteError::NotFound(msg) => {
                        (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
                    }
                    AppwriteError::Unauthorized => {
                        (StatusCode::UNAUTHORIZED, "Unauthorized", None)
                    }
                    AppwriteError::RateLimited => {
                        (StatusCode::TOO_MANY_REQUESTS, "Rate limited", None)
                    }
                    AppwriteError::Api { status, message } => {
                        let http_status = match *status {
                            400 => StatusCode::BAD_REQUEST,
                            403 => StatusCode::FORBIDDEN,
                            409 => StatusCode::CONFLICT,
                            _ => StatusCode::BAD_GATEWAY,
                        };
                        (http_status, "Backend service error", Some(message.clone()))
                    }
                    e => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Backend service error",
                        Some(e.to_string()),
                    ),
                }
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
