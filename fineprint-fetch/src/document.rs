//! HTTP document fetcher.
//!
//! The [`fineprint_core::DocumentFetcher`] implementation: plain HTTP GET
//! with a browser User-Agent plus HTML text extraction. The fetch contract
//! is URL in, readable text out; how the document is retrieved stays behind
//! the trait so other transports can replace this one.

use async_trait::async_trait;
use fineprint_core::{CoreError, DocumentFetcher};
use tracing::{debug, instrument};
use url::Url;

use crate::client::HttpClient;
use crate::error::FetchError;
use crate::extract::html_to_text;

/// Fetches documents over plain HTTP and extracts their text.
#[derive(Debug, Clone, Default)]
pub struct HttpDocumentFetcher {
    client: HttpClient,
}

impl HttpDocumentFetcher {
    /// Creates a new fetcher with default client settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: HttpClient::new()?,
        })
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, CoreError> {
        let parsed = Url::parse(url)
            .map_err(|e| CoreError::InvalidData(format!("Invalid URL {url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CoreError::InvalidData(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let html = self
            .client
            .get_text(url)
            .await
            .map_err(|e| CoreError::FetchFailed(e.to_string()))?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(CoreError::InvalidData(
                "Document contained no readable text".to_string(),
            ));
        }

        debug!(url = %url, chars = text.len(), "Extracted document text");
        Ok(text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_http_schemes() {
        let fetcher = HttpDocumentFetcher::default();

        let err = fetcher.fetch_text("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)));

        let err = fetcher.fetch_text("not a url").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)));
    }
}
