// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Application error types with consistent API responses.
//!
//! The taxonomy mirrors how failures are handled:
//! - input validation and precondition failures abort the operation and keep
//!   the client on the current screen,
//! - upstream (identity/backend) failures surface a mapped message,
//! - `RequiresRecentLogin` is a recoverable state of its own, not a generic
//!   error, because it occurs mid-deletion after the profile is already gone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Re-authentication required")]
    RequiresRecentLogin,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Consent required: {0}")]
    ConsentRequired(String),

    #[error("Entitlement required: {0}")]
    PaymentRequired(String),

    #[error("Identity provider error: {0}")]
    IdentityApi(String),

    #[error("Generation backend error: {0}")]
    BackendApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Identity Toolkit error code for stale sessions.
    pub const RECENT_LOGIN_CODE: &'static str = "CREDENTIAL_TOO_OLD_LOGIN_AGAIN";

    /// Whether an identity error indicates the session is too old for a
    /// sensitive operation (account deletion).
    pub fn is_recent_login_error(&self) -> bool {
        match self {
            AppError::RequiresRecentLogin => true,
            AppError::IdentityApi(msg) => msg.contains(Self::RECENT_LOGIN_CODE),
            _ => false,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::RequiresRecentLogin => (
                StatusCode::UNAUTHORIZED,
                "requires_recent_login",
                Some("Please sign in again to finish deleting your account".to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::PreconditionFailed(msg) => (
                StatusCode::PRECONDITION_FAILED,
                "precondition_failed",
                Some(msg.clone()),
            ),
            AppError::ConsentRequired(msg) => {
                (StatusCode::CONFLICT, "consent_required", Some(msg.clone()))
            }
            AppError::PaymentRequired(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                "payment_required",
                Some(msg.clone()),
            ),
            AppError::IdentityApi(msg) => {
                (StatusCode::BAD_GATEWAY, "identity_error", Some(msg.clone()))
            }
            AppError::BackendApi(msg) => {
                (StatusCode::BAD_GATEWAY, "backend_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
