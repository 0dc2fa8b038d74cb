// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Fineprint AI
//!
//! Model-backed summarization of legal documents.
//!
//! This crate provides:
//!
//! - **Summarizer**: the orchestrator tying cache, credentials, retry, and
//!   the model client together
//! - **CredentialPool**: rotating pool of API keys under a per-key rate
//!   ceiling, with user-key fallback
//! - **ModelClient**: the chat-completions HTTP seam, mockable in tests
//! - **Parser**: tolerant extraction of a structured summary from model prose
//!
//! ## Example
//!
//! ```ignore
//! use fineprint_ai::{CredentialPool, HttpModelClient, Summarizer};
//!
//! let pool = Arc::new(CredentialPool::from_settings(&settings.provider));
//! let summarizer = Summarizer::new(cache, pool, client, fetcher);
//! let summary = summarizer
//!     .summarize("https://example.com/terms", DocumentType::Terms, &settings)
//!     .await?;
//! println!("risk: {:.2}", summary.risk_score);
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompt;

pub use client::{HttpModelClient, ModelClient, ModelRequest};
pub use credentials::{Credential, CredentialPool, RateLimitConfig};
pub use error::AnalysisError;
pub use orchestrator::Summarizer;
pub use parser::{parse_summary, MAX_DATA_RIGHTS, MAX_KEY_POINTS, MAX_RED_FLAGS};
pub use prompt::{build_user_prompt, system_prompt, truncate_chars, MAX_DOCUMENT_CHARS};
