// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Non-success answer from an upstream service, relayed with its status.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Timeout(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Wallet backend failure, rendered in the wallet client's error shape.
    #[error("Wallet error ({status}): {message}")]
    Wallet { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message shown to the client when an upload analysis fails unexpectedly.
    pub const ANALYSIS_FAILED: &'static str = "Failed to analyze dataset";

    /// Message shown to the client for any unexpected server failure.
    pub const INTERNAL: &'static str = "Internal server error";

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { status, .. } | AppError::Wallet { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::AnalysisFailed(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (success, error) = match self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::Timeout(msg) => {
                (None, msg)
            }
            AppError::Upstream { message, .. } => (None, message),
            AppError::Wallet { message, .. } => (Some(false), message),
            AppError::AnalysisFailed(cause) => {
                tracing::error!(error = %cause, "Analyze API error");
                (None, Self::ANALYSIS_FAILED.to_string())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (None, Self::INTERNAL.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (None, Self::INTERNAL.to_string())
            }
        };

        (status, Json(ErrorResponse { success, error })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
