//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::PasswordError;
use crate::domain::DomainError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Admin not found")]
    AdminNotFound(Uuid),

    #[error("Wedding not found")]
    WeddingNotFound(Uuid),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Slug already exists")]
    SlugTaken,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => AppError::InvalidRequest(err.to_string()),
            PasswordError::Hash(msg) => AppError::Internal(msg),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(json!(msg)))
            }
            AppError::EmailTaken => (StatusCode::BAD_REQUEST, "email_taken", None),
            AppError::SlugTaken => (StatusCode::BAD_REQUEST, "slug_taken", None),

            // 401 Unauthorized
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", None),

            // 403 Forbidden
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(json!(msg))),

            // 404 Not Found
            AppError::AdminNotFound(id) => {
                (StatusCode::NOT_FOUND, "admin_not_found", Some(json!(id)))
            }
            AppError::WeddingNotFound(id) => {
                (StatusCode::NOT_FOUND, "wedding_not_found", Some(json!(id)))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::InsufficientCredits {
                    required,
                    available,
                } => (
                    StatusCode::PAYMENT_REQUIRED,
                    "insufficient_credits",
                    Some(json!({ "required": required, "available": available })),
                ),
                DomainError::InvalidAmount(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", Some(json!(msg)))
                }
                DomainError::DesignRequired => (StatusCode::BAD_REQUEST, "design_required", None),
                DomainError::AlreadyPublished => {
                    (StatusCode::BAD_REQUEST, "already_published", None)
                }
                DomainError::NotPublished => (StatusCode::BAD_REQUEST, "not_published", None),
                DomainError::InvalidTransition { from, to } => (
                    StatusCode::BAD_REQUEST,
                    "invalid_transition",
                    Some(json!({ "from": from, "to": to })),
                ),
                DomainError::WeddingArchived => {
                    (StatusCode::BAD_REQUEST, "wedding_archived", None)
                }
                DomainError::InvalidSlug => (StatusCode::BAD_REQUEST, "invalid_slug", None),
                DomainError::BalanceOverflow | DomainError::InvalidPrice { .. } => {
                    tracing::error!("Domain invariant failure: {}", domain_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            },

            AppError::Store(store_err) => match store_err {
                StoreError::Conflict { entity, id, .. } => (
                    StatusCode::CONFLICT,
                    "conflict",
                    Some(json!({ "entity": entity, "id": id })),
                ),
                StoreError::Duplicate(field) => {
                    (StatusCode::BAD_REQUEST, "duplicate", Some(json!(field)))
                }
                StoreError::Missing { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    Some(json!({ "entity": entity, "id": id })),
                ),
                StoreError::Database(e) => {
                    tracing::error!("Database error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
                StoreError::Corrupt(msg) => {
                    tracing::error!("Corrupt record: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            },

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.parts();

        let error = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
