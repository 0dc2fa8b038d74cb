//! Page parsing.
//!
//! Builds a [`PageSnapshot`] of anchor elements from raw HTML. With no
//! renderer in the pipeline, the positional hints are approximated from
//! document structure: `vertical_position` is the anchor's document-order
//! fraction and `in_footer` comes from footer-shaped markup.

use fineprint_core::AnchorId;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::anchor::AnchorElement;

// ============================================================================
// Page Snapshot
// ============================================================================

/// Everything the scanner sees of one page view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// The page URL, used as the base for resolving relative hrefs.
    pub url: String,
    /// Anchors in document order.
    pub anchors: Vec<AnchorElement>,
}

impl PageSnapshot {
    /// Creates an empty snapshot for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anchors: Vec::new(),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses page HTML into a snapshot of its anchors.
///
/// Relative hrefs are resolved against `url`; fragment-only, `javascript:`,
/// `mailto:`, `tel:`, and `data:` hrefs are dropped. Parsing never fails;
/// unparseable markup simply yields fewer anchors.
pub fn parse_page(url: &str, html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return PageSnapshot::new(url);
    };

    let base = Url::parse(url).ok();
    let elements: Vec<ElementRef<'_>> = document.select(&selector).collect();
    let total = elements.len();

    let mut anchors = Vec::with_capacity(total);
    for (index, element) in elements.iter().enumerate() {
        let raw_href = element.value().attr("href").unwrap_or_default();
        let Some(href) = resolve_href(base.as_ref(), raw_href) else {
            continue;
        };

        let text = collapse_whitespace(&element.text().collect::<String>());

        anchors.push(AnchorElement {
            id: AnchorId(index),
            href,
            text,
            aria_label: nonempty_attr(element, "aria-label"),
            title: nonempty_attr(element, "title"),
            in_footer: in_footer(element),
            vertical_position: Some((index + 1) as f32 / total as f32),
        });
    }

    debug!(url = %url, anchors = anchors.len(), "Parsed page");
    PageSnapshot {
        url: url.to_string(),
        anchors,
    }
}

/// Resolves a raw href against the page base, dropping non-document links.
fn resolve_href(base: Option<&Url>, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let lower = raw.to_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    if let Some(base) = base {
        if let Ok(joined) = base.join(raw) {
            return Some(joined.to_string());
        }
    }
    Some(raw.to_string())
}

/// Returns a trimmed attribute value, `None` when absent or blank.
fn nonempty_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// True when the anchor or any ancestor looks like a footer container.
fn in_footer(element: &ElementRef<'_>) -> bool {
    if is_footer_like(element.value()) {
        return true;
    }
    element.ancestors().any(|node| {
        matches!(node.value(), Node::Element(parent) if is_footer_like(parent))
    })
}

fn is_footer_like(element: &scraper::node::Element) -> bool {
    if element.name() == "footer" {
        return true;
    }
    if element.attr("role") == Some("contentinfo") {
        return true;
    }
    if element
        .id()
        .is_some_and(|id| id.to_lowercase().contains("footer"))
    {
        return true;
    }
    element
        .classes()
        .any(|class| class.to_lowercase().contains("footer"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
