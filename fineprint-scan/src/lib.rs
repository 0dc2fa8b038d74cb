// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Fineprint Scan
//!
//! Link classification and incremental page scanning for Fineprint.
//!
//! This crate turns raw page markup into a deduplicated, confidence-scored
//! set of legal-document candidates:
//!
//! - [`page::parse_page`] - HTML to a [`PageSnapshot`] of anchor elements
//! - [`LinkClassifier`] - Pure keyword scoring of one anchor
//! - [`ScanCoordinator`] - Dedup, throttling, footer sweep, and change
//!   notification over a stream of page events
//!
//! ## Example
//!
//! ```ignore
//! use fineprint_scan::{page::parse_page, ScanConfig, ScanCoordinator};
//!
//! let coordinator = ScanCoordinator::new(ScanConfig::default());
//! let page = parse_page("https://example.com", html);
//! coordinator.init(page.url.clone()).await;
//! coordinator.update_page(page).await;
//! let outcome = coordinator.scan().await;
//! ```

// Core modules
pub mod anchor;
pub mod classifier;
pub mod coordinator;
pub mod keywords;
pub mod page;

// Re-export key types at crate root

// Anchors & pages
pub use anchor::AnchorElement;
pub use page::{parse_page, PageSnapshot};

// Classification
pub use classifier::{LinkClassifier, DEFAULT_THRESHOLD};

// Coordination
pub use coordinator::{
    CandidatesChanged, IndicatorRequest, PageEvent, ScanConfig, ScanCoordinator, ScanOutcome,
};
