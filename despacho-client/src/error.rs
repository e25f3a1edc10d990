//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never reached the server (DNS, refused, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: u16,
        /// Response body truncated to a bounded preview
        body_preview: String,
    },

    /// Pre-flight validation failed, no request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// The one-shot post-500 recovery cycle also failed
    #[error("Recovery failed: {0}")]
    RecoveryFailed(String),

    /// Response body could not be normalized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Saving the label artifact failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
