// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Fineprint Core
//!
//! Core types, models, and traits for the Fineprint toolkit.
//!
//! This crate provides the foundational abstractions used across all other
//! Fineprint crates, including:
//!
//! - Domain models (detected links, document types, summaries)
//! - Error types
//! - The collaborator trait for document fetching
//!
//! ## Key Types
//!
//! ### Detection Types
//! - [`DocumentType`] - The legal document categories Fineprint recognizes
//! - [`DetectedLink`] - A classified candidate link found on a page
//! - [`AnchorId`] - Opaque handle to the anchor an accepted link came from
//!
//! ### Summary Types
//! - [`Summary`] - Normalized analysis result for one document
//! - [`RedFlag`] - A concerning clause with category and severity
//! - [`DataRight`] - A user data right and how to exercise it

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Detection types
    AnchorId,
    DetectedLink,
    DocumentType,
    // Summary types
    DataRight,
    DataRightCategory,
    RedFlag,
    RedFlagCategory,
    Severity,
    Summary,
};

// Re-export traits
pub use traits::DocumentFetcher;
