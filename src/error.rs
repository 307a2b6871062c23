//! Unified error types for the Farebox API
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the API
#[derive(Error, Debug)]
pub enum FareboxError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key, or a balance write that kept losing the
    /// compare-and-swap against concurrent writers
    #[error("{0}")]
    Conflict(String),

    /// Business rule: blacklisted media accepts no transactions
    #[error("Transaction not allowed - media is blacklisted")]
    Blacklisted,

    /// Business rule: usage must not overdraw the balance
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Uniform error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Convert FareboxError to HTTP response
impl IntoResponse for FareboxError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FareboxError::Validation(_)
            | FareboxError::Blacklisted
            | FareboxError::InsufficientBalance => (StatusCode::BAD_REQUEST, self.to_string()),
            FareboxError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            FareboxError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            FareboxError::Database(_) | FareboxError::Internal(_) | FareboxError::Io(_) => {
                tracing::error!("internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    // Don't leak details
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for FareboxError {
    fn from(rejection: JsonRejection) -> Self {
        FareboxError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for FareboxError {
    fn from(rejection: PathRejection) -> Self {
        FareboxError::Validation(rejection.body_text())
    }
}

/// Result type alias for API operations
pub type FareboxResult<T> = Result<T, FareboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_400() {
        for err in [
            FareboxError::Validation("bad input".to_string()),
            FareboxError::Blacklisted,
            FareboxError::InsufficientBalance,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn lookup_and_conflict_errors_keep_their_statuses() {
        assert_eq!(
            FareboxError::NotFound("Media not found".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            FareboxError::Conflict("duplicate".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn storage_faults_are_masked_500s() {
        let response = FareboxError::Internal("pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
