//! Unified error handling
//!
//! Every failure surfaces to the caller as a JSON body with a
//! machine-readable `status` code and, where the condition is externally
//! fixable, a `fix` field carrying the exact CUPS command to run.
//!
//! | Status code | HTTP |
//! |-------------|------|
//! | unconfigured_printer | 400 |
//! | not_found | 404 |
//! | disabled | 503 |
//! | not_accepting | 503 |
//! | bad_request | 400 |
//! | unauthorized | 401 |
//! | upload_too_large | 413 |
//! | internal_error | 500 |

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::backend::BackendError;

/// JSON error payload
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable status code
    pub status: &'static str,
    /// Human-readable description
    pub message: String,
    /// Remediation command when the condition is fixable outside the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// Gateway error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // ========== Printer validation (fail-fast precedence order) ==========
    #[error("Unknown printer: {name}. Available: {available}")]
    UnconfiguredPrinter { name: String, available: String },

    #[error("Printer queue not found in CUPS: {queue}")]
    QueueNotFound { queue: String, fix: String },

    #[error("Printer queue is disabled: {queue}")]
    QueueDisabled { queue: String, fix: String },

    #[error("Printer queue is not accepting jobs: {queue}")]
    QueueNotAccepting { queue: String, fix: String },

    // ========== Request errors ==========
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("{0}")]
    UploadTooLarge(String),

    // ========== System errors ==========
    #[error("Spooler error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Machine-readable status code for the JSON body
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::UnconfiguredPrinter { .. } => "unconfigured_printer",
            GatewayError::QueueNotFound { .. } => "not_found",
            GatewayError::QueueDisabled { .. } => "disabled",
            GatewayError::QueueNotAccepting { .. } => "not_accepting",
            GatewayError::BadRequest(_) => "bad_request",
            GatewayError::Unauthorized => "unauthorized",
            GatewayError::UploadTooLarge(_) => "upload_too_large",
            GatewayError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status mapped to this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UnconfiguredPrinter { .. } => StatusCode::BAD_REQUEST,
            GatewayError::QueueNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::QueueDisabled { .. } | GatewayError::QueueNotAccepting { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Remediation command, where one exists
    fn fix(&self) -> Option<String> {
        match self {
            GatewayError::UnconfiguredPrinter { name, .. } => Some(format!(
                "add '{name}=<cups-queue>' to the PRINTERS environment variable"
            )),
            GatewayError::QueueNotFound { fix, .. }
            | GatewayError::QueueDisabled { fix, .. }
            | GatewayError::QueueNotAccepting { fix, .. } => Some(fix.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Internal(msg) = &self {
            error!(target: "spooler", error = %msg, "spooler command failed");
        }

        let body = Json(ErrorBody {
            status: self.code(),
            message: self.to_string(),
            fix: self.fix(),
        });
        (self.status_code(), body).into_response()
    }
}

impl From<BackendError> for GatewayError {
    fn from(e: BackendError) -> Self {
        GatewayError::Internal(e.to_string())
    }
}

impl From<MultipartError> for GatewayError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::UploadTooLarge("multipart payload exceeds the upload limit".into())
        } else {
            GatewayError::BadRequest(format!("multipart error: {}", e.body_text()))
        }
    }
}

/// Result type used by HTTP handlers
pub type GatewayResult<T> = Result<T, GatewayError>;
