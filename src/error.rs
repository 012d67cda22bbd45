//! Error taxonomy for the chat endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Every way a chat request can fail, mapped to an HTTP status.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Upstream call failed after all attempts.
    #[error("{0}")]
    Upstream(#[from] UpstreamError),

    /// Well-formed upstream response without choices.
    #[error("empty answer from AI")]
    EmptyAnswer,

    /// First choice carries no message content.
    #[error("AI answer has no message content")]
    MalformedAnswer,

    /// The chat request outlived `service.request_timeout_secs`.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) | RelayError::Timeout(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::EmptyAnswer | RelayError::MalformedAnswer => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Upstream(_) => "upstream",
            RelayError::EmptyAnswer => "empty_answer",
            RelayError::MalformedAnswer => "malformed_answer",
            RelayError::Timeout(_) => "timeout",
            RelayError::Internal(_) => "internal",
        }
    }
}

/// `{"error": message}` body shared by every error response.
pub fn error_body(message: impl Into<String>) -> serde_json::Value {
    json!({ "error": message.into() })
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_body(self.to_string()))).into_response()
    }
}
