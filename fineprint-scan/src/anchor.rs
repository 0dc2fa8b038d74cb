//! Anchor element model.

use fineprint_core::AnchorId;

/// One anchor-like element extracted from a page.
///
/// This is the classifier's whole view of an anchor: the href plus every
/// piece of text a user or screen reader would associate with it, and the
/// positional hints the secondary footer sweep relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorElement {
    /// Handle correlating classifier output with this element.
    pub id: AnchorId,
    /// Resolved href.
    pub href: String,
    /// Visible text content, whitespace-collapsed.
    pub text: String,
    /// `aria-label` attribute, if present and non-empty.
    pub aria_label: Option<String>,
    /// `title` attribute, if present and non-empty.
    pub title: Option<String>,
    /// True when the anchor sits inside a footer-like container.
    pub in_footer: bool,
    /// Document-order fraction in (0, 1]; 1.0 is the last anchor.
    pub vertical_position: Option<f32>,
}

impl AnchorElement {
    /// Creates a bare anchor from an id, href, and visible text.
    ///
    /// Mostly useful in tests; page parsing fills in the full shape.
    pub fn new(id: AnchorId, href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            href: href.into(),
            text: text.into(),
            aria_label: None,
            title: None,
            in_footer: false,
            vertical_position: None,
        }
    }

    /// The text shown for this anchor in detection results.
    ///
    /// Falls back through aria-label and title to the href for icon-only
    /// anchors with no visible text.
    pub fn display_text(&self) -> &str {
        if !self.text.trim().is_empty() {
            return self.text.trim();
        }
        if let Some(label) = self.aria_label.as_deref() {
            if !label.trim().is_empty() {
                return label.trim();
            }
        }
        if let Some(title) = self.title.as_deref() {
            if !title.trim().is_empty() {
                return title.trim();
            }
        }
        &self.href
    }

    /// True when this anchor qualifies for the secondary footer sweep.
    pub fn in_bottom_region(&self, bottom_fraction: f32) -> bool {
        self.in_footer
            || self
                .vertical_position
                .is_some_and(|v| v >= 1.0 - bottom_fraction)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_fallback_chain() {
        let mut anchor = AnchorElement::new(AnchorId(0), "https://example.com/terms", "  ");
        anchor.aria_label = Some("Terms of Service".to_string());
        assert_eq!(anchor.display_text(), "Terms of Service");

        anchor.aria_label = None;
        anchor.title = Some("Legal".to_string());
        assert_eq!(anchor.display_text(), "Legal");

        anchor.title = None;
        assert_eq!(anchor.display_text(), "https://example.com/terms");
    }

    #[test]
    fn test_bottom_region() {
        let mut anchor = AnchorElement::new(AnchorId(0), "/privacy", "Privacy");
        assert!(!anchor.in_bottom_region(0.2));

        anchor.vertical_position = Some(0.9);
        assert!(anchor.in_bottom_region(0.2));

        anchor.vertical_position = Some(0.5);
        assert!(!anchor.in_bottom_region(0.2));

        anchor.in_footer = true;
        assert!(anchor.in_bottom_region(0.2));
    }
}
