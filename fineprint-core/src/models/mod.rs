//! Domain models for Fineprint.
//!
//! This module contains the core data structures representing detected
//! legal-document links and the normalized summaries produced for them.
//!
//! ## Submodules
//!
//! - [`document`] - Detection types (`DocumentType`, `DetectedLink`, `AnchorId`)
//! - [`summary`] - Analysis types (`Summary`, `RedFlag`, `DataRight`)

mod document;
mod summary;

// Re-export everything at the models level
pub use document::{AnchorId, DetectedLink, DocumentType};
pub use summary::{DataRight, DataRightCategory, RedFlag, RedFlagCategory, Severity, Summary};
