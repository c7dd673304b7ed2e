//! Error type and failure response body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with a structured error code
///
/// Rendered to clients as
///
/// ```json
/// { "success": false, "message": "Logout failed", "error": "..." }
/// ```
///
/// `message` summarises the failed operation and is omitted when the
/// endpoint contract only carries an `error` string.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Client-facing error indicator
    pub error: String,
    /// Optional summary of the operation that failed
    pub message: Option<String>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            error: code.message().to_string(),
            code,
            message: None,
        }
    }

    /// Create a new error with a custom error string
    pub fn with_error(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
            message: None,
        }
    }

    /// Attach an operation summary
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_error(ErrorCode::ValidationFailed, msg)
    }

    /// Malformed request shape
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::with_error(ErrorCode::InvalidFormat, msg)
    }

    /// Create an event not found error
    pub fn event_not_found(id: &str) -> Self {
        Self::with_error(ErrorCode::EventNotFound, format!("Event {id} not found"))
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_error(ErrorCode::DatabaseError, msg)
    }

    /// Create a cookie write error
    pub fn cookie_write(msg: impl Into<String>) -> Self {
        Self::with_error(ErrorCode::CookieWriteFailed, msg)
    }
}

/// Body of every failure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            success: false,
            message: err.message.clone(),
            error: err.error.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorBody::from(&self);

        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                error = %self.error,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}
