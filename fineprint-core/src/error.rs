//! Core error types for Fineprint.

use thiserror::Error;

/// Core error type for Fineprint operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data in a model or response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Document could not be fetched (network, DNS, timeout).
    #[error("Document fetch failed: {0}")]
    FetchFailed(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
