/// Unified error types for the Cirrus console backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors. The inner message is for logs only; every
    /// authentication failure renders as the same generic 401 body so a
    /// caller cannot distinguish "unknown" from "expired" from "revoked".
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    /// The single authentication error surfaced by the session subsystem.
    ///
    /// Unknown token, expired token, revoked token, and a lost rotation
    /// race all funnel through here.
    pub fn invalid_credentials() -> Self {
        ConsoleError::Authentication("invalid credentials".to_string())
    }
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ConsoleError to HTTP response
impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ConsoleError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                "Invalid credentials".to_string(),
            ),
            ConsoleError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            ConsoleError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            ConsoleError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            ConsoleError::Database(_) | ConsoleError::Internal(_) | ConsoleError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
