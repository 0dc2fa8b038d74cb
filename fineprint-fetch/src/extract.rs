//! HTML to plain text extraction.
//!
//! Turns a fetched legal document into the whitespace-collapsed plain text
//! the analysis prompt embeds. No JavaScript rendering; static HTML only.

use scraper::{Html, Node};

/// Elements whose text content is never document prose.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Extracts readable plain text from an HTML document.
///
/// Text inside scripts, styles, and other non-prose containers is dropped;
/// remaining text nodes are joined in document order with all whitespace
/// runs collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        if let Node::Text(text) = node.value() {
            let in_skipped = node.ancestors().any(|ancestor| {
                matches!(ancestor.value(), Node::Element(el) if SKIP_TAGS.contains(&el.name()))
            });
            if in_skipped {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Collapses every whitespace run into a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"
            <html><head><title>Terms</title><style>body { color: red; }</style></head>
            <body>
              <script>console.log("tracking");</script>
              <h1>Terms of Service</h1>
              <p>You agree to everything.</p>
            </body></html>
        "#;
        let text = html_to_text(html);
        assert_eq!(text, "Terms of Service You agree to everything.");
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<p>Hello\n\n   world</p><p>again</p>";
        assert_eq!(html_to_text(html), "Hello world again");
    }

    #[test]
    fn test_nested_markup_joined_in_order() {
        let html = "<div>We <b>never</b> sell <i>your</i> data.</div>";
        assert_eq!(html_to_text(html), "We never sell your data.");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<body><script>x()</script></body>"), "");
    }
}
