//! Summarization orchestration.
//!
//! Ties the pieces together: cache read-through, credential selection,
//! retry with backoff, the model call, and tolerant parsing. Settings are
//! read at call time so a settings change takes effect on the next
//! request without rebuilding the orchestrator.

use fineprint_core::{DocumentFetcher, DocumentType, Summary};
use fineprint_fetch::{with_retry, RetryPolicy};
use fineprint_store::{Settings, SummaryCache};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::client::{ModelClient, ModelRequest};
use crate::credentials::CredentialPool;
use crate::error::AnalysisError;
use crate::parser::parse_summary;
use crate::prompt::{build_user_prompt, system_prompt};

/// Produces summaries for legal documents.
pub struct Summarizer {
    cache: SummaryCache,
    pool: Arc<CredentialPool>,
    client: Arc<dyn ModelClient>,
    fetcher: Arc<dyn DocumentFetcher>,
    retry: RetryPolicy,
}

impl Summarizer {
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        cache: SummaryCache,
        pool: Arc<CredentialPool>,
        client: Arc<dyn ModelClient>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Self {
        Self {
            cache,
            pool,
            client,
            fetcher,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy used for model calls.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Summarizes the document at `url`, fetching its text first.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be fetched, no credential
    /// is configured, or the model call fails after retries. A garbled
    /// model response is not an error; it degrades.
    #[instrument(skip(self, settings))]
    pub async fn summarize(
        &self,
        url: &str,
        document_type: DocumentType,
        settings: &Settings,
    ) -> Result<Summary, AnalysisError> {
        if settings.cache_enabled {
            if let Some(hit) = self.cache.get(url).await {
                debug!(url = url, "Returning cached summary");
                return Ok(hit);
            }
        }

        let text = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|e| AnalysisError::DocumentFetch(e.to_string()))?;
        self.generate(&text, url, document_type, settings).await
    }

    /// Summarizes already-fetched document text.
    ///
    /// # Errors
    ///
    /// Same as [`summarize`](Self::summarize), minus the fetch.
    #[instrument(skip(self, text, settings), fields(chars = text.len()))]
    pub async fn summarize_text(
        &self,
        text: &str,
        url: &str,
        document_type: DocumentType,
        settings: &Settings,
    ) -> Result<Summary, AnalysisError> {
        if settings.cache_enabled {
            if let Some(hit) = self.cache.get(url).await {
                debug!(url = url, "Returning cached summary");
                return Ok(hit);
            }
        }
        self.generate(text, url, document_type, settings).await
    }

    /// Read-only cache probe; never triggers a fetch or model call.
    pub async fn cached_summary(&self, url: &str) -> Option<Summary> {
        self.cache.get(url).await
    }

    /// One full generation pass: credential, model call with retry, parse,
    /// cache write-back.
    async fn generate(
        &self,
        text: &str,
        url: &str,
        document_type: DocumentType,
        settings: &Settings,
    ) -> Result<Summary, AnalysisError> {
        self.pool.sync(&settings.provider).await;

        let provider = &settings.provider;
        let system = system_prompt().to_string();
        let user = build_user_prompt(text, url, document_type);

        let content = with_retry(&self.retry, AnalysisError::class, || async {
            let credential = self.pool.acquire().await?;
            // The dispatch counts against the window whether or not the
            // request succeeds.
            self.pool.record_usage(&credential.id).await;
            let request = ModelRequest {
                base_url: provider.base_url.clone(),
                model: provider.model.clone(),
                api_key: credential.api_key,
                system: system.clone(),
                user: user.clone(),
            };
            self.client.complete(&request).await
        })
        .await?;

        let summary = parse_summary(&content, url, document_type);
        if settings.cache_enabled {
            self.cache.set(url, summary.clone()).await;
        }
        Ok(summary)
    }
}

// ============================================================================
// Tests
// ============================================================================
