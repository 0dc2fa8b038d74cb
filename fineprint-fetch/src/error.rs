//! Fetch error types.

use thiserror::Error;

use crate::retry::ErrorClass;

// ============================================================================
// Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited by the remote host.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the remote host.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Classifies this error for the retry policy.
    ///
    /// Authentication failures and malformed responses will not self-resolve
    /// and are fatal; everything else (network blips, timeouts, rate limits)
    /// is worth retrying.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::AuthenticationFailed(_) | Self::InvalidResponse(_) | Self::Json(_) => {
                ErrorClass::Fatal
            }
            Self::Http(e) => {
                if e.status().is_some_and(|s| s.is_client_error()) {
                    ErrorClass::Fatal
                } else {
                    ErrorClass::Transient
                }
            }
            Self::Timeout(_) | Self::RateLimited { .. } => ErrorClass::Transient,
        }
    }
}
