//! Summarize command - fetch and summarize a legal document.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use fineprint_ai::{CredentialPool, HttpModelClient, Summarizer};
use fineprint_core::{AnchorId, DocumentType};
use fineprint_fetch::HttpDocumentFetcher;
use fineprint_scan::{AnchorElement, LinkClassifier};
use fineprint_store::{JsonFileStorage, SettingsStore, SummaryCache};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the summarize command.
#[derive(Args)]
pub struct SummarizeArgs {
    /// Document URL to summarize.
    pub url: String,

    /// Document type: terms, privacy, cookies, or eula.
    /// Inferred from the URL when omitted.
    #[arg(long)]
    pub doc_type: Option<String>,

    /// Skip the cache entirely for this request.
    #[arg(long)]
    pub no_cache: bool,

    /// Regenerate even when a cached summary exists.
    #[arg(long)]
    pub refresh: bool,
}

/// Runs the summarize command.
pub async fn run(args: &SummarizeArgs, cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let mut settings = store.get().await;
    if args.no_cache {
        settings.cache_enabled = false;
    }

    let document_type = match &args.doc_type {
        Some(raw) => DocumentType::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("Unknown document type: {raw}"))?,
        None => infer_document_type(&args.url),
    };
    info!(url = %args.url, document_type = %document_type, "Summarizing document");

    let cache = SummaryCache::new(Arc::new(JsonFileStorage::default_location()))
        .with_ttl(settings.cache_ttl());
    cache.load().await;
    if args.refresh {
        cache.remove(&args.url).await;
    }

    let summarizer = Summarizer::new(
        cache,
        Arc::new(CredentialPool::from_settings(&settings.provider)),
        Arc::new(HttpModelClient::new()?),
        Arc::new(HttpDocumentFetcher::new()?),
    );

    let summary = summarizer
        .summarize(&args.url, document_type, &settings)
        .await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_summary(&summary, settings.risk_threshold)
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&summary)?);
        }
    }

    Ok(())
}

/// Guesses the document type by classifying the URL as if it were an
/// anchor, defaulting to terms of service.
fn infer_document_type(url: &str) -> DocumentType {
    let anchor = AnchorElement::new(AnchorId(0), url, "");
    LinkClassifier::default()
        .classify_with_threshold(&anchor, 0.0)
        .map_or(DocumentType::Terms, |link| link.document_type)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_document_type_from_url() {
        assert_eq!(
            infer_document_type("https://example.com/privacy-policy"),
            DocumentType::Privacy
        );
        assert_eq!(
            infer_document_type("https://example.com/legal/eula"),
            DocumentType::Eula
        );
        assert_eq!(
            infer_document_type("https://example.com/cookie-policy"),
            DocumentType::Cookies
        );
    }

    #[test]
    fn test_infer_falls_back_to_terms() {
        assert_eq!(
            infer_document_type("https://example.com/pricing"),
            DocumentType::Terms
        );
    }
}
