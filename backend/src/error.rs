//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors render as `{"status":"error","msg":...}` so chat clients see one shape.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request was rejected before any side effect
    #[error("{0}")]
    InvalidInput(String),

    /// Requested media does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body exceeded the configured limit
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Log or media write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(msg) => AppError::InvalidInput(msg),
            StoreError::NotFound(media_ref) => AppError::NotFound(media_ref),
            StoreError::Io(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl AppError {
    /// HTTP status the error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "status": "error",
            "msg": self.to_string(),
        }));

        (status, body).into_response()
    }
}
