// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every handler error renders as `{"error": <code>, "message": <text>}`.
//! Server-side failures are logged here and reported to the client with a
//! generic message only.

use crate::models::alert::{DispatchReport, RecipientOutcome};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

const GENERIC_SERVER_ERROR: &str = "Server error";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No token provided")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A required external provider or secret is not configured.
    #[error("{0}")]
    ProviderUnavailable(String),

    /// Every attempted recipient failed.
    #[error("Alert delivery failed for all {} recipients", .0.attempted())]
    DeliveryFailed(DispatchReport),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<RecipientOutcome>>,
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::ProviderUnavailable(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::ProviderUnavailable(_) => "provider_unavailable",
            AppError::DeliveryFailed(_) => "delivery_failed",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, results) = match self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (GENERIC_SERVER_ERROR.to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (GENERIC_SERVER_ERROR.to_string(), None)
            }
            AppError::ProviderUnavailable(msg) => {
                tracing::error!(error = %msg, "SMS provider unavailable");
                (msg, None)
            }
            AppError::DeliveryFailed(report) => {
                tracing::error!(
                    attempted = report.attempted(),
                    "Emergency alert reached no recipients"
                );
                (
                    "Failed to deliver emergency alert to any contact".to_string(),
                    Some(report.results),
                )
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: code,
            message,
            results,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
