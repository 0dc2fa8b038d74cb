//! Tolerant parsing of model responses.
//!
//! Models wrap their JSON in prose, markdown fences, and apologies. This
//! module digs the first well-formed JSON object out of whatever came
//! back, coerces loose category and severity strings onto the closed
//! enums, and bounds every array. A response with no usable JSON yields
//! a degraded summary, never an error.

use fineprint_core::{
    DataRight, DataRightCategory, DocumentType, RedFlag, RedFlagCategory, Severity, Summary,
};
use serde::Deserialize;
use tracing::warn;

/// Maximum key points kept from a response.
pub const MAX_KEY_POINTS: usize = 6;

/// Maximum red flags kept from a response.
pub const MAX_RED_FLAGS: usize = 5;

/// Maximum data rights kept from a response.
pub const MAX_DATA_RIGHTS: usize = 5;

/// Key point used when the response could not be parsed.
const DEGRADED_NOTE: &str =
    "The analysis service returned an unreadable response; showing a placeholder summary instead.";

// ============================================================================
// Raw Response Shape
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    red_flags: Vec<RawRedFlag>,
    #[serde(default)]
    data_rights: Vec<RawDataRight>,
    #[serde(default)]
    risk_score: f32,
}

#[derive(Debug, Deserialize)]
struct RawRedFlag {
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    quote: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDataRight {
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_true")]
    available: bool,
    #[serde(default)]
    exercise_process: Option<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// JSON Extraction
// ============================================================================

/// Byte length of the balanced object starting at the first byte of
/// `text`, which must be `{`. String contents and escapes are skipped.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the first well-formed JSON object in `text`, tolerating
/// surrounding prose and stray braces.
fn extract_json_object(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('{') {
        let start = search_from + rel;
        if let Some(len) = balanced_end(&text[start..]) {
            let candidate = &text[start..start + len];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

// ============================================================================
// Parsing
// ============================================================================

/// Turns a raw model response into a [`Summary`].
///
/// Unknown red-flag categories fold to `Other`, unknown data-right
/// categories to `Access`, unknown severities to `Medium`; the risk score
/// is clamped and arrays are capped. An unusable response degrades to a
/// placeholder summary instead of failing.
pub fn parse_summary(text: &str, url: &str, document_type: DocumentType) -> Summary {
    let Some(json) = extract_json_object(text) else {
        warn!("No JSON object in model response, producing degraded summary");
        return Summary::degraded(url, document_type, DEGRADED_NOTE);
    };

    let raw: RawSummary = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Malformed summary JSON, producing degraded summary");
            return Summary::degraded(url, document_type, DEGRADED_NOTE);
        }
    };

    let key_points: Vec<String> = raw
        .key_points
        .into_iter()
        .map(|point| point.trim().to_string())
        .filter(|point| !point.is_empty())
        .take(MAX_KEY_POINTS)
        .collect();

    let red_flags: Vec<RedFlag> = raw
        .red_flags
        .into_iter()
        .filter(|flag| !flag.description.trim().is_empty())
        .take(MAX_RED_FLAGS)
        .map(|flag| RedFlag {
            category: RedFlagCategory::parse_lenient(&flag.category),
            description: flag.description.trim().to_string(),
            severity: Severity::parse_lenient(&flag.severity),
            quote: flag.quote.filter(|quote| !quote.trim().is_empty()),
        })
        .collect();

    let data_rights: Vec<DataRight> = raw
        .data_rights
        .into_iter()
        .filter(|right| !right.description.trim().is_empty())
        .take(MAX_DATA_RIGHTS)
        .map(|right| DataRight {
            category: DataRightCategory::parse_lenient(&right.category),
            description: right.description.trim().to_string(),
            available: right.available,
            exercise_process: right.exercise_process.filter(|p| !p.trim().is_empty()),
        })
        .collect();

    Summary::new(
        url,
        document_type,
        key_points,
        red_flags,
        data_rights,
        raw.risk_score,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/terms";

    #[test]
    fn test_parses_clean_json() {
        let response = r#"{
            "key_points": ["You grant a broad content license"],
            "red_flags": [
                {"category": "arbitration", "description": "Disputes go to binding arbitration", "severity": "high", "quote": "you waive your right to a jury trial"}
            ],
            "data_rights": [
                {"category": "deletion", "description": "You may delete your account", "available": true, "exercise_process": "account settings"}
            ],
            "risk_score": 0.7
        }"#;

        let summary = parse_summary(response, URL, DocumentType::Terms);
        assert!(!summary.degraded);
        assert_eq!(summary.key_points.len(), 1);
        assert_eq!(summary.red_flags[0].category, RedFlagCategory::Arbitration);
        assert_eq!(summary.red_flags[0].severity, Severity::High);
        assert_eq!(summary.data_rights[0].category, DataRightCategory::Deletion);
        assert!((summary.risk_score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_extracts_json_from_prose_and_fences() {
        let response = "Sure! Here is the analysis you asked for:\n```json\n{\"key_points\": [\"Point one\"], \"risk_score\": 0.4}\n```\nLet me know if you need anything else.";

        let summary = parse_summary(response, URL, DocumentType::Privacy);
        assert!(!summary.degraded);
        assert_eq!(summary.key_points, vec!["Point one".to_string()]);
        assert!((summary.risk_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_skips_stray_braces_before_object() {
        let response = "Notation like {this} is not JSON. {\"key_points\": [\"Real\"], \"risk_score\": 0.1}";
        let summary = parse_summary(response, URL, DocumentType::Terms);
        assert!(!summary.degraded);
        assert_eq!(summary.key_points, vec!["Real".to_string()]);
    }

    #[test]
    fn test_refusal_degrades_without_panic() {
        let summary = parse_summary("I cannot process this.", URL, DocumentType::Terms);
        assert!(summary.degraded);
        assert_eq!(summary.key_points.len(), 1);
        assert!((summary.risk_score - 0.0).abs() < f32::EPSILON);
        assert!(summary.red_flags.is_empty());
        assert!(summary.data_rights.is_empty());
    }

    #[test]
    fn test_unknown_categories_fold() {
        let response = r#"{
            "key_points": ["p"],
            "red_flags": [{"category": "weird_banana", "description": "d", "severity": "catastrophic"}],
            "data_rights": [{"category": "telepathy", "description": "d"}],
            "risk_score": 0.2
        }"#;

        let summary = parse_summary(response, URL, DocumentType::Terms);
        assert_eq!(summary.red_flags[0].category, RedFlagCategory::Other);
        assert_eq!(summary.red_flags[0].severity, Severity::Medium);
        assert_eq!(summary.data_rights[0].category, DataRightCategory::Access);
        assert!(summary.data_rights[0].available);
    }

    #[test]
    fn test_arrays_are_capped() {
        let points: Vec<String> = (0..20).map(|i| format!("\"p{i}\"")).collect();
        let flags: Vec<String> = (0..20)
            .map(|i| {
                format!("{{\"category\": \"other\", \"description\": \"f{i}\", \"severity\": \"low\"}}")
            })
            .collect();
        let rights: Vec<String> = (0..20)
            .map(|i| format!("{{\"category\": \"access\", \"description\": \"r{i}\"}}"))
            .collect();
        let response = format!(
            "{{\"key_points\": [{}], \"red_flags\": [{}], \"data_rights\": [{}], \"risk_score\": 0.3}}",
            points.join(","),
            flags.join(","),
            rights.join(",")
        );

        let summary = parse_summary(&response, URL, DocumentType::Terms);
        assert_eq!(summary.key_points.len(), MAX_KEY_POINTS);
        assert_eq!(summary.red_flags.len(), MAX_RED_FLAGS);
        assert_eq!(summary.data_rights.len(), MAX_DATA_RIGHTS);
    }

    #[test]
    fn test_risk_score_clamped() {
        let summary = parse_summary(
            r#"{"key_points": ["p"], "risk_score": 7.5}"#,
            URL,
            DocumentType::Terms,
        );
        assert!((summary.risk_score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_the_scan() {
        let response = r#"{"key_points": ["Uses {curly} braces and a quote \" inside"], "risk_score": 0.05}"#;
        let summary = parse_summary(response, URL, DocumentType::Terms);
        assert!(!summary.degraded);
        assert_eq!(summary.key_points.len(), 1);
        assert!(summary.key_points[0].contains("{curly}"));
    }

    #[test]
    fn test_missing_fields_default() {
        let summary = parse_summary(r#"{"key_points": ["only points"]}"#, URL, DocumentType::Eula);
        assert!(!summary.degraded);
        assert!(summary.red_flags.is_empty());
        assert!(summary.data_rights.is_empty());
        assert!((summary.risk_score - 0.0).abs() < f32::EPSILON);
    }
}
