//! Summary-related types.
//!
//! This module contains the normalized analysis output:
//! - [`Summary`] - Main container for one analyzed document
//! - [`RedFlag`] - A concerning clause with severity
//! - [`DataRight`] - A user data right the document grants
//! - [`Severity`] - Low/medium/high ranking

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::DocumentType;
use crate::error::CoreError;

// ============================================================================
// Red Flags
// ============================================================================

/// Categories of concerning clauses.
///
/// Model responses use free-form category strings; anything outside this
/// set folds to [`RedFlagCategory::Other`] at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedFlagCategory {
    /// Mandatory arbitration / class-action waiver.
    Arbitration,
    /// Automatic subscription renewal.
    AutoRenewal,
    /// Sharing or selling data to third parties.
    DataSharing,
    /// Broad liability disclaimers.
    Liability,
    /// One-sided termination rights.
    Termination,
    /// Anything that does not fit the named categories.
    Other,
}

impl RedFlagCategory {
    /// Parses a category string, folding unknown values to `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "arbitration" => Self::Arbitration,
            "auto-renewal" | "autorenewal" => Self::AutoRenewal,
            "data-sharing" | "datasharing" => Self::DataSharing,
            "liability" => Self::Liability,
            "termination" => Self::Termination,
            _ => Self::Other,
        }
    }

    /// Returns the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Arbitration => "Arbitration",
            Self::AutoRenewal => "Auto-Renewal",
            Self::DataSharing => "Data Sharing",
            Self::Liability => "Liability",
            Self::Termination => "Termination",
            Self::Other => "Other",
        }
    }
}

/// Severity ranking for red flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth knowing, unlikely to matter.
    Low,
    /// Meaningful but common practice.
    Medium,
    /// Unusual or particularly user-hostile.
    High,
}

impl Severity {
    /// Parses a severity string, folding unknown values to `Medium`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// Returns the lowercase name used in serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concerning clause found in an analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    /// What kind of concern this is.
    pub category: RedFlagCategory,
    /// One-sentence description of the clause.
    pub description: String,
    /// How concerning the clause is.
    pub severity: Severity,
    /// Supporting quote from the document, when the model provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

// ============================================================================
// Data Rights
// ============================================================================

/// Categories of user data rights.
///
/// Unknown category strings fold to [`DataRightCategory::Access`] at
/// parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataRightCategory {
    /// Right to access collected data.
    Access,
    /// Right to have data deleted.
    Deletion,
    /// Right to export data in a portable format.
    Portability,
    /// Right to correct inaccurate data.
    Correction,
    /// Right to opt out of sale or processing.
    OptOut,
}

impl DataRightCategory {
    /// Parses a category string, folding unknown values to `Access`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "deletion" | "delete" | "erasure" => Self::Deletion,
            "portability" => Self::Portability,
            "correction" | "rectification" => Self::Correction,
            "opt-out" | "optout" => Self::OptOut,
            _ => Self::Access,
        }
    }

    /// Returns the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Access => "Access",
            Self::Deletion => "Deletion",
            Self::Portability => "Portability",
            Self::Correction => "Correction",
            Self::OptOut => "Opt-Out",
        }
    }
}

/// A data right the document grants (or withholds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRight {
    /// Which right this describes.
    pub category: DataRightCategory,
    /// One-sentence description of the right as stated.
    pub description: String,
    /// Whether the document actually makes the right available.
    #[serde(default = "default_true")]
    pub available: bool,
    /// How to exercise the right, when the document says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_process: Option<String>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Summary
// ============================================================================

/// Normalized output of one document analysis.
///
/// Produced once per successful analysis and immutable afterwards; owned by
/// whichever cache entry or result list holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Stable identifier derived from the URL and generation time.
    pub id: String,
    /// URL of the analyzed document.
    pub url: String,
    /// What kind of document was analyzed.
    pub document_type: DocumentType,
    /// Plain-language takeaways, most important first.
    pub key_points: Vec<String>,
    /// Concerning clauses, ordered as returned by the model.
    pub red_flags: Vec<RedFlag>,
    /// Data rights the document addresses.
    pub data_rights: Vec<DataRight>,
    /// Overall risk estimate, clamped to [0, 1].
    pub risk_score: f32,
    /// When this summary was generated.
    pub generated_at: DateTime<Utc>,
    /// True when this is the minimal fallback built from an unparseable
    /// model response.
    #[serde(default)]
    pub degraded: bool,
}

impl Summary {
    /// Creates a new summary, clamping `risk_score` into [0, 1].
    pub fn new(
        url: impl Into<String>,
        document_type: DocumentType,
        key_points: Vec<String>,
        red_flags: Vec<RedFlag>,
        data_rights: Vec<DataRight>,
        risk_score: f32,
    ) -> Self {
        let url = url.into();
        let generated_at = Utc::now();
        let risk_score = if risk_score.is_finite() {
            risk_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            id: make_id(&url, generated_at),
            url,
            document_type,
            key_points,
            red_flags,
            data_rights,
            risk_score,
            generated_at,
            degraded: false,
        }
    }

    /// Creates the minimal fallback summary for an unparseable model
    /// response: one explanatory key point, zero risk, `degraded` set.
    pub fn degraded(
        url: impl Into<String>,
        document_type: DocumentType,
        note: impl Into<String>,
    ) -> Self {
        let mut summary = Self::new(url, document_type, vec![note.into()], vec![], vec![], 0.0);
        summary.degraded = true;
        summary
    }

    /// Returns the risk bucket this summary falls into.
    ///
    /// Thirds of the [0, 1] range: below 1/3 is low, below 2/3 is medium,
    /// the rest is high.
    pub fn risk_level(&self) -> Severity {
        if self.risk_score < 1.0 / 3.0 {
            Severity::Low
        } else if self.risk_score < 2.0 / 3.0 {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Validates the summary data.
    ///
    /// Ensures `risk_score` is finite and within [0, 1]. This should be
    /// called after deserializing cached summaries to catch malformed
    /// stored data.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if `risk_score` is negative,
    /// greater than 1, or not a finite number.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.risk_score.is_finite() {
            return Err(CoreError::InvalidData(
                "risk_score is not a finite number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.risk_score) {
            return Err(CoreError::InvalidData(format!(
                "risk_score {} out of valid range [0, 1]",
                self.risk_score
            )));
        }
        Ok(())
    }
}

/// Builds a stable summary id from the URL and generation time.
fn make_id(url: &str, generated_at: DateTime<Utc>) -> String {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    format!("{:08x}-{}", hasher.finish() as u32, generated_at.timestamp_millis())
}

// ============================================================================
// Tests
// ============================================================================
