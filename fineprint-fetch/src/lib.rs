// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Fineprint Fetch
//!
//! HTTP fetching, text extraction, and the retry policy for Fineprint.
//!
//! This crate provides the network-facing infrastructure the analysis
//! pipeline depends on:
//!
//! - [`HttpClient`] - HTTP client with timeout and status mapping
//! - [`extract::html_to_text`] - HTML to readable plain text
//! - [`HttpDocumentFetcher`] - The [`fineprint_core::DocumentFetcher`]
//!   implementation combining the two
//! - [`RetryPolicy`] / [`with_retry`] - Generic bounded retry with
//!   exponential backoff and fatal-vs-transient classification
//!
//! ## Example
//!
//! ```ignore
//! use fineprint_fetch::{with_retry, ErrorClass, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! let result = with_retry(&policy, |e: &MyError| e.class(), || async {
//!     call_remote().await
//! })
//! .await;
//! ```

// Core modules
pub mod client;
pub mod document;
pub mod error;
pub mod extract;
pub mod retry;

// Re-export key types at crate root

// Errors
pub use error::FetchError;

// HTTP + extraction
pub use client::HttpClient;
pub use document::HttpDocumentFetcher;
pub use extract::html_to_text;

// Retry
pub use retry::{with_retry, ErrorClass, RetryPolicy};
