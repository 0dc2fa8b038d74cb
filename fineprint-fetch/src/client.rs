//! HTTP client abstractions.

use std::time::Duration;

use reqwest::{header, Client, Response};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Default request timeout in seconds.
///
/// Kept short so a hung fetch cannot wedge the callers' timers.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Browser-like User-Agent.
///
/// Legal-document pages frequently sit behind bot filters that reject
/// obvious non-browser agents.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client with retry capabilities.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry_policy: RetryPolicy,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            inner: client,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Sets the retry policy for this client.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Performs a GET request and returns the response body as text.
    ///
    /// Transport failures the policy classifies as retryable (connect
    /// errors, timeouts) are retried with backoff; HTTP 429 waits out the
    /// advertised `Retry-After` when attempts remain.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RateLimited`] when 429 persists past the
    /// attempt bound, [`FetchError::AuthenticationFailed`] on 401/403, and
    /// [`FetchError::InvalidResponse`] on any other non-success status.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempts = 0;
        let max_attempts = self.retry_policy.max_attempts;

        loop {
            attempts += 1;
            debug!(url = %url, attempt = attempts, "Making GET request");

            let result = self.inner.get(url).send().await;

            match result {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response.text().await?);
                    }

                    // Handle rate limiting
                    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get(header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok());

                        if attempts < max_attempts {
                            let wait_secs = retry_after
                                .unwrap_or(self.retry_policy.base_delay.as_secs().max(1));
                            warn!(wait_secs, "Rate limited, waiting before retry");
                            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                            continue;
                        }

                        return Err(FetchError::RateLimited { retry_after });
                    }

                    // Handle auth errors
                    if response.status() == reqwest::StatusCode::UNAUTHORIZED
                        || response.status() == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(FetchError::AuthenticationFailed(
                            "Access to the document was refused".to_string(),
                        ));
                    }

                    return Err(FetchError::InvalidResponse(format!(
                        "Unexpected status code: {}",
                        response.status()
                    )));
                }
                Err(e) => {
                    if attempts < max_attempts && self.retry_policy.should_retry(&e) {
                        let delay = self.retry_policy.delay_for_attempt(attempts);
                        warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Performs a simple GET request without retry handling.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] on any transport failure.
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        Ok(self.inner.get(url).send().await?)
    }
}

impl Default for HttpClient {
    /// Creates a default HTTP client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built, which only happens when
    /// the system TLS configuration is unusable.
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            panic!(
                "Failed to create HTTP client: {}. \
                This usually indicates a broken TLS/SSL configuration.",
                e
            )
        })
    }
}
