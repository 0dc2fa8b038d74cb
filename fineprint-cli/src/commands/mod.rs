//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod scan;
pub mod summarize;
