//! Error types for Support Pulse.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::source::SourceError;

/// Unified error type for Support Pulse operations.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Ticket source error: {0}")]
    Source(#[from] SourceError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<QueryRejection> for PulseError {
    fn from(rejection: QueryRejection) -> Self {
        PulseError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for PulseError {
    fn from(rejection: JsonRejection) -> Self {
        PulseError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for PulseError {
    fn from(rejection: PathRejection) -> Self {
        PulseError::BadRequest(rejection.body_text())
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for PulseError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            PulseError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            PulseError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            PulseError::Source(e) => {
                // Upstream bodies may carry credentials or internals
                tracing::error!(error = %e, "Ticket source error");
                (
                    StatusCode::BAD_GATEWAY,
                    "SOURCE_ERROR",
                    "Failed to fetch tickets from the ticket source".to_string(),
                    Some(e.kind().to_string()),
                )
            }
            PulseError::Serialization(e) => (
                StatusCode::BAD_REQUEST,
                "SERIALIZATION_ERROR",
                "Failed to process request/response".to_string(),
                Some(e.to_string()),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for Support Pulse operations.
pub type PulseResult<T> = Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (PulseError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PulseError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                PulseError::Source(SourceError::NotConfigured("jira".into())),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
