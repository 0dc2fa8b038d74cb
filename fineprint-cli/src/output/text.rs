//! Text output formatting with colors.

use fineprint_core::{DetectedLink, Severity, Summary};
use fineprint_store::{CacheStats, Settings};
use std::path::Path;

use super::json::AnchorScoreOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Risk bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats the detected links of one scan.
    pub fn format_links(
        &self,
        page_url: &str,
        anchors_seen: usize,
        links: &[DetectedLink],
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} {}", self.bold("Scanned"), page_url));
        lines.push(self.dim(&format!("{anchors_seen} anchors examined")));
        lines.push(String::new());

        if links.is_empty() {
            lines.push("No legal document links found".to_string());
            return lines.join("\n");
        }

        lines.push(format!("Legal documents found: {}", links.len()));
        for link in links {
            let confidence =
                self.color_for_confidence(link.confidence, &format!("{:.2}", link.confidence));
            lines.push(format!(
                "  {:<28} {:<18} {} {}",
                truncate(&link.display_text, 28),
                link.document_type.display_name(),
                confidence,
                self.dim(&link.url),
            ));
        }

        lines.join("\n")
    }

    /// Formats scored anchors for `scan --all`.
    pub fn format_anchor_scores(&self, page_url: &str, rows: &[AnchorScoreOutput]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} {}", self.bold("Scanned"), page_url));
        lines.push(format!(
            "{:<30} {:<18} {:>6}  {}",
            "Text", "Type", "Score", "Accepted"
        ));
        lines.push("─".repeat(66));

        for row in rows {
            let type_name = row.document_type.map_or("−", |t| t.display_name());
            let marker = if row.accepted {
                self.green("✓")
            } else {
                self.dim("−")
            };
            let footer_note = if row.in_footer {
                self.dim(" (footer)")
            } else {
                String::new()
            };
            lines.push(format!(
                "{:<30} {:<18} {:>6.3}  {marker}{footer_note}",
                truncate(&row.text, 30),
                type_name,
                row.score,
            ));
        }

        lines.join("\n")
    }

    /// Formats a document summary, flagging risk at or above
    /// `risk_threshold`.
    pub fn format_summary(&self, summary: &Summary, risk_threshold: f32) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold(&format!(
            "{} Summary",
            summary.document_type.display_name()
        )));
        lines.push("─".repeat(50));
        lines.push(format!("URL:       {}", self.cyan(&summary.url)));
        lines.push(format!(
            "Risk:      {} {}",
            self.risk_bar(summary.risk_score),
            self.color_for_risk(
                summary.risk_score,
                &format!(
                    "{:.1} ({})",
                    summary.risk_score,
                    summary.risk_level().as_str()
                ),
            ),
        ));
        lines.push(format!(
            "Generated: {}",
            self.dim(&summary.generated_at.format("%Y-%m-%d %H:%M UTC").to_string())
        ));

        if summary.risk_score >= risk_threshold {
            lines.push(self.red(&format!(
                "Risk is at or above your configured threshold ({risk_threshold})"
            )));
        }

        if summary.degraded {
            lines.push(self.yellow(
                "Partial result: the analysis response could not be fully parsed.",
            ));
        }

        if !summary.key_points.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Key points"));
            for point in &summary.key_points {
                lines.push(format!("  • {point}"));
            }
        }

        if !summary.red_flags.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Red flags"));
            for flag in &summary.red_flags {
                let severity = self
                    .color_for_severity(flag.severity, &format!("[{}]", flag.severity.as_str()));
                lines.push(format!(
                    "  {severity} {}: {}",
                    flag.category.display_name(),
                    flag.description
                ));
                if let Some(quote) = &flag.quote {
                    lines.push(self.dim(&format!("      \"{quote}\"")));
                }
            }
        }

        if !summary.data_rights.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Your data rights"));
            for right in &summary.data_rights {
                let marker = if right.available {
                    self.green("✓")
                } else {
                    self.red("✗")
                };
                lines.push(format!(
                    "  {marker} {}: {}",
                    right.category.display_name(),
                    right.description
                ));
                if let Some(process) = &right.exercise_process {
                    lines.push(self.dim(&format!("      How: {process}")));
                }
            }
        }

        lines.join("\n")
    }

    /// Formats cache statistics.
    pub fn format_cache_stats(&self, stats: &CacheStats, path: &Path) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("Summary Cache"));
        lines.push("─".repeat(40));
        lines.push(format!(
            "Entries:  {} / {}",
            stats.total_entries, stats.capacity
        ));
        lines.push(format!("Hits:     {}", stats.total_hits));
        lines.push(format!("Location: {}", path.display()));

        lines.join("\n")
    }

    /// Formats settings with the API key masked.
    pub fn format_settings(&self, settings: &Settings) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("Fineprint Configuration"));
        lines.push("─".repeat(40));
        lines.push(String::new());
        lines.push(format!("Cache enabled:  {}", settings.cache_enabled));
        lines.push(format!(
            "Cache expiry:   {} days",
            settings.cache_expiry_days
        ));
        lines.push(format!("Risk threshold: {}", settings.risk_threshold));
        lines.push(String::new());
        lines.push(format!("Model:          {}", settings.provider.model));
        lines.push(format!("Base URL:       {}", settings.provider.base_url));
        lines.push(format!(
            "API key:        {}",
            self.mask_key(settings.provider.user_api_key.as_deref())
        ));
        lines.push(format!(
            "Key env var:    {}",
            settings.provider.key_env_name()
        ));
        lines.push(format!(
            "Pool keys:      {}",
            settings.provider.pool_keys.len()
        ));
        lines.push(format!(
            "Rate limit:     {} requests / {}s",
            settings.provider.max_requests, settings.provider.window_secs
        ));

        lines.join("\n")
    }

    /// Renders the risk bar; high risk fills red.
    pub fn risk_bar(&self, risk: f32) -> String {
        let clamped = risk.clamp(0.0, 1.0);
        let filled = (f64::from(clamped) * self.bar_width as f64).round() as usize;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_risk(clamped, &bar)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn mask_key(&self, key: Option<&str>) -> String {
        match key {
            Some(_) => "configured".to_string(),
            None => self.dim("not set"),
        }
    }

    fn color_for_risk(&self, risk: f32, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if risk < 1.0 / 3.0 {
            self.green(text)
        } else if risk < 2.0 / 3.0 {
            self.yellow(text)
        } else {
            self.red(text)
        }
    }

    fn color_for_confidence(&self, confidence: f32, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        if confidence >= 0.6 {
            self.green(text)
        } else if confidence >= 0.3 {
            self.yellow(text)
        } else {
            self.dim(text)
        }
    }

    fn color_for_severity(&self, severity: Severity, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }

        match severity {
            Severity::Low => self.dim(text),
            Severity::Medium => self.yellow(text),
            Severity::High => self.red(text),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", BOLD, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", DIM, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", GREEN, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn yellow(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", YELLOW, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn red(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", RED, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn cyan(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", CYAN, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Truncates to at most `max` characters, ellipsizing longer text.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bar_empty() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.risk_bar(0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_risk_bar_full() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.risk_bar(1.0), "██████████");
    }

    #[test]
    fn test_risk_bar_half() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.risk_bar(0.5), "█████░░░░░");
    }

    #[test]
    fn test_risk_colors() {
        let formatter = TextFormatter::new(true);
        assert!(formatter.color_for_risk(0.1, "x").contains(GREEN));
        assert!(formatter.color_for_risk(0.5, "x").contains(YELLOW));
        assert!(formatter.color_for_risk(0.9, "x").contains(RED));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("a much longer piece of text", 10), "a much lo…");
    }

    #[test]
    fn test_mask_key() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.mask_key(Some("sk-secret")), "configured");
        assert_eq!(formatter.mask_key(None), "not set");
    }
}
