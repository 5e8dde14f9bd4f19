//! Error types shared by the upstream client, the aggregator and the gateway handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced while answering a gateway request.
///
/// `Transport` and `Status` both describe a failed exchange with an upstream
/// repository; `Decode` describes a response that arrived but did not match
/// the record schema. `NotFound` is the expected outcome of looking up a
/// package the directory has never seen.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed: {reason}")]
    Status { url: String, reason: String },

    #[error("Malformed response from {repo}: {source}")]
    Decode {
        repo: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown package: {0}")]
    NotFound(String),
}

impl GatewayError {
    /// True for failures that happened while talking to an upstream
    /// (connection, timeout, non-success status).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport { .. } | GatewayError::Status { .. }
        )
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, GatewayError::Decode { .. })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
