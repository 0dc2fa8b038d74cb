//! Weighted keyword link classifier.
//!
//! A pure, total function over one anchor: no I/O, no shared state, no
//! errors. Malformed input scores zero and yields `None`.

use fineprint_core::{DetectedLink, DocumentType};
use tracing::trace;

use crate::anchor::AnchorElement;
use crate::keywords::{CategoryKeywords, CATEGORIES};

/// Default acceptance threshold.
///
/// Intentionally low to favor recall over precision: a stray indicator is
/// cheap, a missed legal link is not.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Weight multiplier for a keyword that appears as a whole token.
const WHOLE_TOKEN_MULTIPLIER: f32 = 1.5;

/// Flat score bonus when a category URL pattern occurs in the href.
const URL_PATTERN_BONUS: f32 = 0.5;

// ============================================================================
// Classifier
// ============================================================================

/// Scores anchors against the per-category keyword tables.
#[derive(Debug, Clone, Copy)]
pub struct LinkClassifier {
    threshold: f32,
}

impl LinkClassifier {
    /// Creates a classifier with the given acceptance threshold.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// The configured acceptance threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Classifies one anchor, emitting a link when the best category score
    /// exceeds the configured threshold.
    pub fn classify(&self, anchor: &AnchorElement) -> Option<DetectedLink> {
        self.classify_with_threshold(anchor, self.threshold)
    }

    /// Classifies with an explicit acceptance threshold.
    ///
    /// The threshold only gates emission; the assigned type is always the
    /// argmax category, so lowering the threshold never reassigns types.
    pub fn classify_with_threshold(
        &self,
        anchor: &AnchorElement,
        threshold: f32,
    ) -> Option<DetectedLink> {
        let haystack = combined_haystack(anchor);
        if haystack.is_empty() {
            return None;
        }
        let href = anchor.href.to_lowercase();

        let mut best_type: Option<DocumentType> = None;
        let mut best_score = 0.0_f32;
        for category in CATEGORIES {
            // Strictly greater, so the earlier category wins ties.
            let score = score_category(category, &haystack, &href);
            if score > best_score {
                best_score = score;
                best_type = Some(category.document_type);
            }
        }

        let document_type = best_type?;
        if best_score <= threshold {
            trace!(
                href = %anchor.href,
                score = best_score,
                threshold,
                "Best score below threshold"
            );
            return None;
        }

        Some(DetectedLink::new(
            anchor.href.clone(),
            anchor.display_text(),
            document_type,
            best_score,
            anchor.id,
        ))
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Scores one category against the combined haystack and href.
fn score_category(category: &CategoryKeywords, haystack: &str, href: &str) -> f32 {
    let total = category.total_keyword_length() as f32;
    if total == 0.0 {
        return 0.0;
    }

    let mut matched = 0.0_f32;
    for keyword in category.keywords {
        if let Some(weight) = keyword_weight(haystack, keyword) {
            matched += keyword.len() as f32 * weight;
        }
    }

    let mut score = matched / total;
    if category.url_patterns.iter().any(|p| href.contains(p)) {
        score += URL_PATTERN_BONUS;
    }
    score
}

/// Returns the weight for a matched keyword, or `None` when absent.
fn keyword_weight(haystack: &str, keyword: &str) -> Option<f32> {
    if !haystack.contains(keyword) {
        return None;
    }
    if has_whole_token_match(haystack, keyword) {
        Some(WHOLE_TOKEN_MULTIPLIER)
    } else {
        Some(1.0)
    }
}

/// True when `keyword` occurs bounded by non-alphanumeric characters or
/// string edges.
fn has_whole_token_match(haystack: &str, keyword: &str) -> bool {
    for (idx, _) in haystack.match_indices(keyword) {
        let bounded_before = idx == 0
            || haystack[..idx]
                .chars()
                .next_back()
                .is_some_and(|c| !c.is_alphanumeric());
        let end = idx + keyword.len();
        let bounded_after = end == haystack.len()
            || haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_alphanumeric());
        if bounded_before && bounded_after {
            return true;
        }
    }
    false
}

/// Builds the combined lowercase haystack from everything a user or screen
/// reader would associate with the anchor, whitespace-collapsed so
/// multi-word keywords match across line breaks.
fn combined_haystack(anchor: &AnchorElement) -> String {
    let mut parts: Vec<&str> = vec![anchor.text.as_str()];
    if let Some(label) = anchor.aria_label.as_deref() {
        parts.push(label);
    }
    if let Some(title) = anchor.title.as_deref() {
        parts.push(title);
    }
    parts.push(anchor.href.as_str());

    let joined = parts.join(" ").to_lowercase();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fineprint_core::AnchorId;

    fn anchor(href: &str, text: &str) -> AnchorElement {
        AnchorElement::new(AnchorId(0), href, text)
    }

    #[test]
    fn test_privacy_policy_with_url_bonus() {
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/privacy-policy", "Privacy Policy"))
            .expect("should classify");

        assert_eq!(link.document_type, DocumentType::Privacy);
        assert!(link.confidence >= 0.5, "score {} below 0.5", link.confidence);
    }

    #[test]
    fn test_terms_of_service() {
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/terms", "Terms of Service"))
            .expect("should classify");

        assert_eq!(link.document_type, DocumentType::Terms);
    }

    #[test]
    fn test_eula_short_text() {
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/eula", "EULA"))
            .expect("should classify");

        assert_eq!(link.document_type, DocumentType::Eula);
        assert!(link.confidence >= 0.5);
    }

    #[test]
    fn test_embedded_substring_not_a_match() {
        // "photos" contains "tos" but only mid-word; the tiny substring
        // weight stays under the threshold.
        let result = LinkClassifier::default()
            .classify(&anchor("https://example.com/gallery", "photos"));
        assert!(result.is_none());
    }

    #[test]
    fn test_whole_token_outscores_embedded_match() {
        // Both anchors match the same four-letter keyword; only the token
        // boundary differs.
        let classifier = LinkClassifier::default();
        let whole = classifier
            .classify(&anchor("https://example.com/a", "EULA"))
            .expect("whole-token match emitted");
        let embedded = classifier
            .classify(&anchor("https://example.com/b", "Eulalia"))
            .expect("embedded match emitted");

        assert_eq!(whole.document_type, DocumentType::Eula);
        assert_eq!(embedded.document_type, DocumentType::Eula);
        assert!(whole.confidence > embedded.confidence);
    }

    #[test]
    fn test_empty_anchor_yields_none() {
        let result = LinkClassifier::default().classify(&anchor("", ""));
        assert!(result.is_none());
    }

    #[test]
    fn test_argmax_picks_strongest_category() {
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/legal", "Privacy Policy and Terms"))
            .expect("should classify");

        // Privacy keywords dominate the combined text.
        assert_eq!(link.document_type, DocumentType::Privacy);
    }

    #[test]
    fn test_threshold_gates_emission_not_type() {
        let classifier = LinkClassifier::default();
        // Bare "Terms" scores well under the default threshold.
        let weak = anchor("https://example.com/about", "Terms");

        assert!(classifier.classify(&weak).is_none());

        let link = classifier
            .classify_with_threshold(&weak, 0.0)
            .expect("emitted at zero threshold");
        assert_eq!(link.document_type, DocumentType::Terms);
    }

    #[test]
    fn test_confidence_clamped_at_one() {
        // Every privacy keyword as a whole token plus the URL bonus pushes
        // the raw score past 1; the emitted confidence is clamped.
        let text = "Privacy Policy Privacy Notice Privacy Statement Data Policy Data Protection";
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/privacy", text))
            .expect("should classify");

        assert_eq!(link.confidence, 1.0);
    }

    #[test]
    fn test_aria_label_participates() {
        let mut icon = anchor("https://example.com/privacy-policy", "");
        icon.aria_label = Some("Privacy Policy".to_string());

        let link = LinkClassifier::default()
            .classify(&icon)
            .expect("should classify");
        assert_eq!(link.document_type, DocumentType::Privacy);
        assert_eq!(link.display_text, "Privacy Policy");
    }

    #[test]
    fn test_multiword_keyword_matches_across_newlines() {
        let link = LinkClassifier::default()
            .classify(&anchor("https://example.com/tc", "Terms\n    and\nConditions"))
            .expect("should classify");
        assert_eq!(link.document_type, DocumentType::Terms);
    }
}
