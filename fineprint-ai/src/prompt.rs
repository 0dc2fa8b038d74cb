//! Prompt construction for the summarization request.

use fineprint_core::DocumentType;

/// Maximum number of document characters embedded in a prompt.
///
/// Legal documents routinely run long; everything past this bound adds
/// cost without changing the verdict.
pub const MAX_DOCUMENT_CHARS: usize = 8000;

/// Truncates `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The system prompt fixing role and output shape.
pub fn system_prompt() -> &'static str {
    r#"You are a legal document analyst. Read the document and produce a concise, factual analysis for a non-lawyer.

Respond with a single JSON object in exactly this shape, and nothing else:
{
  "key_points": ["plain-language takeaways, most important first"],
  "red_flags": [
    {
      "category": "arbitration" | "auto-renewal" | "data-sharing" | "liability" | "termination" | "other",
      "description": "what the clause does and why it matters",
      "severity": "low" | "medium" | "high",
      "quote": "short supporting excerpt from the document"
    }
  ],
  "data_rights": [
    {
      "category": "access" | "deletion" | "portability" | "correction" | "opt-out",
      "description": "what the user can do",
      "available": true,
      "exercise_process": "how to exercise it, if stated"
    }
  ],
  "risk_score": 0.0
}

risk_score is a float in [0, 1]: 0 means unusually user-friendly, 1 means unusually hostile. Only report what the document states. If the document is not a legal document, say so in key_points and use risk_score 0."#
}

/// Builds the user prompt embedding the (truncated) document text.
pub fn build_user_prompt(text: &str, url: &str, document_type: DocumentType) -> String {
    format!(
        "Document type: {}\nURL: {}\n\nDocument text:\n{}",
        document_type.display_name(),
        url,
        truncate_chars(text, MAX_DOCUMENT_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 8000), "hello");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // Multi-byte characters must not be split.
        let text = "é".repeat(10);
        let truncated = truncate_chars(&text, 4);
        assert_eq!(truncated.chars().count(), 4);
        assert_eq!(truncated, "éééé");
    }

    #[test]
    fn test_user_prompt_truncates_document() {
        let text = "z".repeat(MAX_DOCUMENT_CHARS + 500);
        let prompt = build_user_prompt(&text, "https://example.com/terms", DocumentType::Terms);
        let embedded = prompt.chars().filter(|c| *c == 'z').count();
        assert_eq!(embedded, MAX_DOCUMENT_CHARS);
        assert!(prompt.contains("Terms of Service"));
        assert!(prompt.contains("https://example.com/terms"));
    }

    #[test]
    fn test_system_prompt_names_the_shape() {
        let prompt = system_prompt();
        assert!(prompt.contains("key_points"));
        assert!(prompt.contains("red_flags"));
        assert!(prompt.contains("data_rights"));
        assert!(prompt.contains("risk_score"));
    }
}
