//! Scan command - find legal document links on a page.

use anyhow::{Context, Result};
use clap::Args;
use fineprint_fetch::HttpClient;
use fineprint_scan::{
    parse_page, LinkClassifier, PageSnapshot, ScanConfig, ScanCoordinator, DEFAULT_THRESHOLD,
};
use tracing::info;

use crate::output::{AnchorScoreOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Page to scan: an http(s) URL or a local HTML file.
    pub target: String,

    /// Score every anchor, including rejected ones.
    #[arg(long)]
    pub all: bool,

    /// Acceptance threshold override.
    #[arg(long, short = 't')]
    pub threshold: Option<f32>,
}

/// Runs the scan command.
pub async fn run(args: &ScanArgs, cli: &Cli) -> Result<()> {
    let (page_url, html) = load_target(&args.target).await?;
    info!(url = %page_url, bytes = html.len(), "Scanning page");

    let snapshot = parse_page(&page_url, &html);
    let threshold = args.threshold.unwrap_or(DEFAULT_THRESHOLD);

    if args.all {
        return score_all_anchors(&snapshot, threshold, cli);
    }

    // Run the full pipeline pass so single-shot scans behave exactly like
    // live ones, footer sweep included.
    let coordinator = ScanCoordinator::new(ScanConfig {
        threshold,
        ..ScanConfig::default()
    });
    coordinator.init(&page_url).await;
    coordinator.update_page(snapshot.clone()).await;
    coordinator.scan().await;
    let links = coordinator.detected_links().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_links(&page_url, snapshot.anchors.len(), &links)
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_scan(&page_url, snapshot.anchors.len(), &links)?
            );
        }
    }

    Ok(())
}

/// Scores every anchor at threshold zero and reports which ones the
/// configured threshold would accept.
fn score_all_anchors(snapshot: &PageSnapshot, threshold: f32, cli: &Cli) -> Result<()> {
    let classifier = LinkClassifier::new(threshold);

    let rows: Vec<AnchorScoreOutput> = snapshot
        .anchors
        .iter()
        .map(|anchor| {
            let best = classifier.classify_with_threshold(anchor, 0.0);
            AnchorScoreOutput {
                url: anchor.href.clone(),
                text: anchor.display_text().to_string(),
                document_type: best.as_ref().map(|link| link.document_type),
                score: best.as_ref().map_or(0.0, |link| link.confidence),
                accepted: best.is_some_and(|link| link.confidence > threshold),
                in_footer: anchor.in_footer,
            }
        })
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_anchor_scores(&snapshot.url, &rows));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&rows)?);
        }
    }

    Ok(())
}

/// Loads the target as a URL or a local file, returning the page URL and
/// its HTML.
async fn load_target(target: &str) -> Result<(String, String)> {
    if target.starts_with("http://") || target.starts_with("https://") {
        let client = HttpClient::new()?;
        let html = client.get_text(target).await?;
        return Ok((target.to_string(), html));
    }

    let html = tokio::fs::read_to_string(target)
        .await
        .with_context(|| format!("Failed to read {target}"))?;
    Ok((format!("file://{target}"), html))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fineprint_core::DocumentType;

    const FOOTER_PAGE: &str = r#"
        <html><body>
        <a href="/pricing">Pricing</a>
        <footer>
            <a href="/terms">Terms of Service</a>
            <a href="/privacy-policy">Privacy Policy</a>
        </footer>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_scan_finds_footer_links() {
        let snapshot = parse_page("https://example.com", FOOTER_PAGE);
        let coordinator = ScanCoordinator::new(ScanConfig::default());
        coordinator.init("https://example.com").await;
        coordinator.update_page(snapshot).await;
        coordinator.scan().await;

        let links = coordinator.detected_links().await;
        let types: Vec<DocumentType> = links.iter().map(|l| l.document_type).collect();
        assert!(types.contains(&DocumentType::Terms));
        assert!(types.contains(&DocumentType::Privacy));
    }

    #[test]
    fn test_score_all_includes_rejected_anchors() {
        let snapshot = parse_page("https://example.com", FOOTER_PAGE);
        let classifier = LinkClassifier::new(DEFAULT_THRESHOLD);

        let scored: Vec<Option<f32>> = snapshot
            .anchors
            .iter()
            .map(|anchor| {
                classifier
                    .classify_with_threshold(anchor, 0.0)
                    .map(|link| link.confidence)
            })
            .collect();

        assert_eq!(scored.len(), 3);
        // "Pricing" matches nothing.
        assert!(scored[0].is_none());
        assert!(scored[1].is_some());
        assert!(scored[2].is_some());
    }
}
