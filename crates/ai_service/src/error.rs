//! AI service errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to an AI service backend
#[derive(Debug, Error)]
pub enum AiError {
    /// The selected backend does not provide this capability
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// The audio input could not be opened or read
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Synthesized audio could not be persisted
    #[error("Cannot write {}: {source}", path.display())]
    OutputWrite {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Failed to connect to the remote service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the remote service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Transport-level timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Remote service answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message reported by the service
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Streaming transport broke mid-response
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Invalid context
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
