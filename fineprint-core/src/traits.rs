//! Trait definitions for Fineprint.
//!
//! This module defines the collaborator seams the core pipeline depends on.

use async_trait::async_trait;

use crate::error::CoreError;

/// Trait for collaborators that can turn a URL into extracted document text.
///
/// Implementors are responsible for:
/// - Retrieving the document (HTTP, an open tab, a local file, ...)
/// - Stripping markup, scripts, and styles
/// - Collapsing whitespace into readable plain text
///
/// The summarization orchestrator consumes this trait and never cares how
/// the text was obtained. Implementations must bound their work with a
/// timeout so a hung retrieval cannot block the caller indefinitely.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the plain text of the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FetchFailed`] on network, DNS, or timeout
    /// failures, and [`CoreError::InvalidData`] when the response cannot
    /// be interpreted as a text document.
    async fn fetch_text(&self, url: &str) -> Result<String, CoreError>;
}
