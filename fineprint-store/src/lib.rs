// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Fineprint Store
//!
//! State management for the Fineprint pipeline.
//!
//! This crate provides:
//!
//! - **SummaryCache**: TTL + LRU cache for generated document summaries
//! - **SettingsStore**: User preferences with persistence and change notification
//! - **StorageBackend**: Pluggable key-value persistence (memory or JSON file)
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use fineprint_store::{JsonFileStorage, SettingsStore, SummaryCache};
//! use std::sync::Arc;
//!
//! // Load settings and open the cache
//! let settings = SettingsStore::load_default().await?;
//! let storage = Arc::new(JsonFileStorage::default_location());
//! let cache = SummaryCache::new(storage);
//! cache.load().await;
//!
//! // Subscribe to settings changes
//! let mut rx = settings.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Settings updated!");
//! }
//! ```

pub mod error;
pub mod persistence;
pub mod settings_store;
pub mod storage;
pub mod summary_cache;

pub use error::StoreError;
pub use persistence::{
    default_cache_dir, default_cache_path, default_config_dir, default_settings_path, ensure_dir,
    load_json, load_json_or_default, save_json,
};
pub use settings_store::{ProviderSettings, Settings, SettingsStore, DEFAULT_API_KEY_ENV};
pub use storage::{JsonFileStorage, MemoryStorage, StorageBackend};
pub use summary_cache::{
    CacheEntry, CacheStats, ResultCache, SummaryCache, DEFAULT_CAPACITY, DEFAULT_TTL,
};
