//! Detection-related types.
//!
//! This module contains types produced by the link classifier:
//! - [`DocumentType`] - The legal-document categories
//! - [`DetectedLink`] - A classified candidate link
//! - [`AnchorId`] - Opaque handle to the source anchor

use serde::{Deserialize, Serialize};

// ============================================================================
// Document Type
// ============================================================================

/// The legal-document categories Fineprint recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// Terms of service / terms and conditions.
    Terms,
    /// Privacy policy or privacy notice.
    Privacy,
    /// Cookie policy or cookie notice.
    Cookies,
    /// End-user license agreement.
    Eula,
}

impl DocumentType {
    /// Returns the display name for this document type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Terms => "Terms of Service",
            Self::Privacy => "Privacy Policy",
            Self::Cookies => "Cookie Policy",
            Self::Eula => "License Agreement",
        }
    }

    /// Returns the short lowercase name used in CLI arguments and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Privacy => "privacy",
            Self::Cookies => "cookies",
            Self::Eula => "eula",
        }
    }

    /// Returns all document types in classifier tie-break order.
    ///
    /// When two categories score identically, the one appearing earlier
    /// here wins.
    pub fn all() -> &'static [DocumentType] {
        &[Self::Terms, Self::Privacy, Self::Cookies, Self::Eula]
    }

    /// Parses a document type from a user-facing string.
    ///
    /// Accepts common aliases ("tos", "t&c", "license").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "terms" | "tos" | "t&c" | "terms-of-service" => Some(Self::Terms),
            "privacy" | "privacy-policy" => Some(Self::Privacy),
            "cookies" | "cookie" | "cookie-policy" => Some(Self::Cookies),
            "eula" | "license" | "license-agreement" => Some(Self::Eula),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Anchor Handle
// ============================================================================

/// Opaque handle to the anchor element a detected link came from.
///
/// The value is the anchor's index in its page's extraction order; consumers
/// must treat it as opaque and only use it to correlate a [`DetectedLink`]
/// with the element it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub usize);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

// ============================================================================
// Detected Link
// ============================================================================

/// A classified candidate link found on a page.
///
/// Immutable once created. Owned by the scan coordinator's candidate set and
/// discarded when the page unloads or an explicit rescan resets the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLink {
    /// Absolute URL the anchor points at.
    pub url: String,
    /// Visible text of the anchor (trimmed).
    pub display_text: String,
    /// The winning document category.
    pub document_type: DocumentType,
    /// Classifier confidence, clamped to [0, 1].
    pub confidence: f32,
    /// Handle to the source anchor element.
    pub source: AnchorId,
}

impl DetectedLink {
    /// Creates a new detected link, clamping `confidence` into [0, 1].
    ///
    /// The raw classifier score can exceed 1.0 when the exact-match and
    /// URL-pattern bonuses stack; downstream consumers rely on the hard
    /// ceiling, so the clamp happens here.
    pub fn new(
        url: impl Into<String>,
        display_text: impl Into<String>,
        document_type: DocumentType,
        confidence: f32,
        source: AnchorId,
    ) -> Self {
        Self {
            url: url.into(),
            display_text: display_text.into(),
            document_type,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    /// Returns true if `other` duplicates this link within one candidate set.
    ///
    /// Two links collide when they share a URL, or when they share both
    /// display text and document type.
    pub fn collides_with(&self, other: &DetectedLink) -> bool {
        self.url == other.url
            || (self.display_text == other.display_text
                && self.document_type == other.document_type)
    }
}

// ============================================================================
// Tests
// ============================================================================
