//! Integration tests for core summary types.

use fineprint_core::{DocumentType, Summary};

#[test]
fn test_summary_serialization_roundtrip() {
    let summary = Summary::new(
        "https://example.com/terms",
        DocumentType::Terms,
        vec!["Short and readable.".to_string()],
        vec![],
        vec![],
        0.3,
    );
    let json = serde_json::to_string(&summary).unwrap();
    let parsed: Summary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.url, summary.url);
    assert_eq!(parsed.document_type, DocumentType::Terms);
    assert!(!parsed.degraded);
}

#[test]
fn test_summary_validation() {
    let mut summary = Summary::degraded(
        "https://example.com/privacy",
        DocumentType::Privacy,
        "Unreadable response.",
    );
    assert!(summary.validate().is_ok());

    summary.risk_score = 2.0;
    assert!(summary.validate().is_err());
}
