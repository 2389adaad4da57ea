/// Error types for Conference Service
///
/// Errors are converted to JSON HTTP responses with an `error` string body.
/// Not-found and ownership failures are deliberately the same variant so
/// responses never leak whether another user's recording exists.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

/// Result type for conference-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request input
    Validation(String),

    /// No authenticated user where one is required
    Unauthorized(String),

    /// Missing resource or ownership mismatch (conflated on purpose)
    NotFoundOrUnauthorized(String),

    /// Terminal-only operation attempted while still recording
    NotYetCompleted(String),

    /// Share link past its expiry
    ExpiredShareLink(String),

    /// Egress platform or object store unreachable/erroring
    Upstream(String),

    /// Database operation failed
    DatabaseError(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "{}", msg),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::NotFoundOrUnauthorized(msg) => write!(f, "{}", msg),
            AppError::NotYetCompleted(msg) => write!(f, "{}", msg),
            AppError::ExpiredShareLink(msg) => write!(f, "{}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFoundOrUnauthorized(_) => StatusCode::NOT_FOUND,
            AppError::NotYetCompleted(_) => StatusCode::BAD_REQUEST,
            AppError::ExpiredShareLink(_) => StatusCode::GONE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::egress::EgressError> for AppError {
    fn from(err: crate::egress::EgressError) -> Self {
        AppError::Upstream(err.to_string())
    }
}
