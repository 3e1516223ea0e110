//! Error types for the REST API.
//!
//! Every error leaves the server as a JSON body of the form
//! `{"status": <code>, "error": <reason>, "message": <text>}`.
//!
//! # Error Mapping
//!
//! | Source | HTTP Status | Message |
//! |--------|-------------|---------|
//! | Tenant header missing or blank | 400 | `MISSING X-Tenant-ID header` |
//! | Tenant not allow-listed | 404 | `Invalid tenant ID` |
//! | Malformed query parameters | 400 | parser message |
//! | `ResourceError::NotFound` | 404 | entity and id |
//! | Any other storage error | 500 | generic text, cause logged |

use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stratum_persistence::error::{ResourceError, StorageError};
use thiserror::Error;
use tracing::error;

/// Body text of every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The primary error type for REST API operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// The tenant header was absent or blank (HTTP 400).
    #[error("MISSING {header} header")]
    MissingTenant {
        /// The configured tenant header name.
        header: String,
    },

    /// The tenant claim is not allow-listed (HTTP 404).
    #[error("Invalid tenant ID")]
    UnknownTenant,

    /// Malformed request (HTTP 400).
    #[error("{message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Entity not found in the current tenant (HTTP 404).
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind, e.g. `user`.
        entity: String,
        /// The requested key.
        id: String,
    },

    /// Anything past the gate that is not the caller's fault (HTTP 500).
    ///
    /// The detail is logged when the error is created and never sent.
    #[error("internal error: {detail}")]
    Internal {
        /// Cause chain, for logs only.
        detail: String,
    },
}

/// Result type for REST handlers.
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    /// Creates an internal error and logs `detail`.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(error = %detail, "Request failed");
        RestError::Internal { detail }
    }

    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::MissingTenant { .. } | RestError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            RestError::UnknownTenant | RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message sent to the client.
    pub fn public_message(&self) -> String {
        match self {
            RestError::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Renders an error and its sources as `outer: inner: ...`.
fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(ResourceError::NotFound { entity, id }) => {
                RestError::NotFound { entity, id }
            }
            other => RestError::internal(error_chain(&other)),
        }
    }
}
