//! JSON output formatting.

use anyhow::Result;
use fineprint_core::{DetectedLink, DocumentType};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one detected link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutput {
    pub url: String,
    pub text: String,
    pub document_type: DocumentType,
    pub confidence: f32,
}

/// JSON output for a whole scan.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput {
    pub page_url: String,
    pub anchors_seen: usize,
    pub links: Vec<LinkOutput>,
}

/// JSON output for one scored anchor in `scan --all`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorScoreOutput {
    pub url: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    pub score: f32,
    pub accepted: bool,
    pub in_footer: bool,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a scan result.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn format_scan(
        &self,
        page_url: &str,
        anchors_seen: usize,
        links: &[DetectedLink],
    ) -> Result<String> {
        let output = ScanOutput {
            page_url: page_url.to_string(),
            anchors_seen,
            links: links.iter().map(Self::link_to_output).collect(),
        };
        self.format(&output)
    }

    /// Converts a detected link to output.
    fn link_to_output(link: &DetectedLink) -> LinkOutput {
        LinkOutput {
            url: link.url.clone(),
            text: link.display_text.clone(),
            document_type: link.document_type,
            confidence: link.confidence,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fineprint_core::AnchorId;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_scan_output_field_names() {
        let formatter = JsonFormatter::new(false);
        let link = DetectedLink::new(
            "https://example.com/terms",
            "Terms of Service",
            DocumentType::Terms,
            0.8,
            AnchorId(0),
        );

        let output = formatter
            .format_scan("https://example.com", 12, &[link])
            .unwrap();

        assert!(output.contains(r#""pageUrl":"https://example.com""#));
        assert!(output.contains(r#""anchorsSeen":12"#));
        assert!(output.contains(r#""documentType":"terms""#));
    }
}
