//! Keyword and URL-pattern tables for link classification.
//!
//! One table per document category. Keyword scores are weighted by keyword
//! length, so longer, more specific phrases dominate; URL patterns add a
//! flat bonus when they occur in the href path. All entries are lowercase;
//! the classifier lowercases its input before matching.

use fineprint_core::DocumentType;

/// Keywords and URL patterns for one document category.
#[derive(Debug)]
pub struct CategoryKeywords {
    /// The category these tables score for.
    pub document_type: DocumentType,
    /// Phrases matched against the anchor's combined text.
    pub keywords: &'static [&'static str],
    /// Literal path substrings matched against the href.
    pub url_patterns: &'static [&'static str],
}

/// All category tables, in classifier tie-break order.
pub const CATEGORIES: &[CategoryKeywords] = &[
    CategoryKeywords {
        document_type: DocumentType::Terms,
        keywords: &[
            "terms of service",
            "terms of use",
            "terms and conditions",
            "terms",
            "tos",
            "user agreement",
            "service agreement",
            "legal terms",
            "conditions of use",
        ],
        url_patterns: &[
            "/terms-of-service",
            "/terms-of-use",
            "/terms-and-conditions",
            "/terms",
            "/tos",
            "/legal/terms",
        ],
    },
    CategoryKeywords {
        document_type: DocumentType::Privacy,
        keywords: &[
            "privacy policy",
            "privacy notice",
            "privacy statement",
            "privacy",
            "data policy",
            "data protection",
        ],
        url_patterns: &[
            "/privacy-policy",
            "/privacy-notice",
            "/privacy",
            "/data-protection",
        ],
    },
    CategoryKeywords {
        document_type: DocumentType::Cookies,
        keywords: &[
            "cookie policy",
            "cookie notice",
            "cookies",
            "cookie preferences",
            "cookie settings",
        ],
        url_patterns: &[
            "/cookie-policy",
            "/cookie-notice",
            "/cookies",
            "/cookie-settings",
        ],
    },
    CategoryKeywords {
        document_type: DocumentType::Eula,
        keywords: &["eula", "license agreement", "software license"],
        url_patterns: &["/eula", "/license-agreement", "/license"],
    },
];

impl CategoryKeywords {
    /// Sum of the lengths of every keyword in this category.
    ///
    /// The per-keyword score is normalized by this, keeping category scores
    /// roughly comparable despite different table sizes.
    pub fn total_keyword_length(&self) -> usize {
        self.keywords.iter().map(|k| k.len()).sum()
    }
}

/// Returns the table for a document type.
pub fn for_type(document_type: DocumentType) -> &'static CategoryKeywords {
    CATEGORIES
        .iter()
        .find(|c| c.document_type == document_type)
        .unwrap_or(&CATEGORIES[0])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_all_types_in_order() {
        let types: Vec<DocumentType> = CATEGORIES.iter().map(|c| c.document_type).collect();
        assert_eq!(types.as_slice(), DocumentType::all());
    }

    #[test]
    fn test_tables_are_lowercase() {
        for category in CATEGORIES {
            for keyword in category.keywords {
                assert_eq!(*keyword, keyword.to_lowercase(), "keyword not lowercase");
                assert!(!keyword.is_empty());
            }
            for pattern in category.url_patterns {
                assert_eq!(*pattern, pattern.to_lowercase(), "pattern not lowercase");
                assert!(pattern.starts_with('/'), "pattern must be a path substring");
            }
        }
    }

    #[test]
    fn test_for_type_returns_matching_table() {
        assert_eq!(
            for_type(DocumentType::Privacy).document_type,
            DocumentType::Privacy
        );
        assert!(for_type(DocumentType::Eula).keywords.contains(&"eula"));
    }
}
