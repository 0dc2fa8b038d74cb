//! Analysis error types.

use fineprint_fetch::ErrorClass;
use thiserror::Error;

/// Errors that can occur while producing a summary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model API rate limited the request.
    #[error("Rate limited by model API")]
    RateLimited {
        /// Seconds to wait, when the API said so.
        retry_after: Option<u64>,
    },

    /// Credential rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Neither a credential pool nor a user key is configured.
    #[error("No API credentials configured")]
    NoCredentials,

    /// The account's quota is exhausted.
    #[error("Request quota exhausted: {0}")]
    QuotaExceeded(String),

    /// The document itself could not be fetched.
    #[error("Document fetch failed: {0}")]
    DocumentFetch(String),

    /// The model API returned something unusable.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Classifies the error for retry purposes.
    ///
    /// Rate limits and transport failures are worth another attempt;
    /// configuration and content problems are not.
    pub fn class(&self) -> ErrorClass {
        match self {
            AnalysisError::RateLimited { .. } => ErrorClass::Transient,
            AnalysisError::Http(e) => {
                if let Some(status) = e.status() {
                    if status.is_client_error() {
                        return ErrorClass::Fatal;
                    }
                }
                ErrorClass::Transient
            }
            AnalysisError::AuthenticationFailed(_)
            | AnalysisError::NoCredentials
            | AnalysisError::QuotaExceeded(_)
            | AnalysisError::DocumentFetch(_)
            | AnalysisError::InvalidResponse(_)
            | AnalysisError::Json(_) => ErrorClass::Fatal,
        }
    }

    /// Human-readable message suitable for end-user display.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::RateLimited { .. } => {
                "The analysis service is busy right now. Please try again shortly.".to_string()
            }
            AnalysisError::AuthenticationFailed(_) | AnalysisError::NoCredentials => {
                "No working API credentials. Configure an API key in settings or set the \
                 FINEPRINT_API_KEY environment variable."
                    .to_string()
            }
            AnalysisError::QuotaExceeded(_) => {
                "The API quota for the configured credentials is exhausted.".to_string()
            }
            other => format!("Failed to summarize the document: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            AnalysisError::RateLimited { retry_after: None }.class(),
            ErrorClass::Transient
        );
        assert_eq!(
            AnalysisError::AuthenticationFailed("401".to_string()).class(),
            ErrorClass::Fatal
        );
        assert_eq!(AnalysisError::NoCredentials.class(), ErrorClass::Fatal);
        assert_eq!(
            AnalysisError::InvalidResponse("garbage".to_string()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_user_messages() {
        let busy = AnalysisError::RateLimited { retry_after: Some(30) }.user_message();
        assert!(busy.contains("try again"));

        let configure = AnalysisError::NoCredentials.user_message();
        assert!(configure.contains("API key"));

        let generic = AnalysisError::InvalidResponse("oops".to_string()).user_message();
        assert!(generic.contains("Failed to summarize"));
    }
}
