//! Error taxonomy for the ingestion pipeline.

use thiserror::Error;

/// Errors raised by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum AisError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket transport failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The server closed the connection.
    #[error("Connection closed: {reason}")]
    ConnectionClosed {
        /// Close reason reported by the server, if any.
        reason: String,
    },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persistence sink rejected a commit.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AisError {
    /// Whether the supervisor should reconnect after this error.
    ///
    /// Only configuration errors are terminal; everything else is recovered
    /// by backoff and retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// Result type for pipeline operations.
pub type AisResult<T> = Result<T, AisError>;
