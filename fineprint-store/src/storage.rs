//! Pluggable key-value persistence.
//!
//! The summary cache stores its state through this seam so tests and
//! ephemeral runs can stay in memory while normal runs write a JSON
//! file under the platform cache directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_cache_path, load_json, save_json};

// ============================================================================
// Backend Trait
// ============================================================================

/// String-keyed storage for serialized state.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// Memory Backend
// ============================================================================

/// In-memory storage backend.
///
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON File Backend
// ============================================================================

/// File-backed storage: one JSON object holding all keys.
///
/// Writes go through the atomic temp-file + rename path used for all
/// persisted state.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates a backend storing its map at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a backend at the default platform cache path.
    pub fn default_location() -> Self {
        Self::new(default_cache_path())
    }

    /// The file this backend writes to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        load_json(&self.path).await
    }
}

#[async_trait]
impl StorageBackend for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        save_json(&self.path, &map).await?;
        debug!(path = %self.path.display(), key = key, "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            save_json(&self.path, &map).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("a").await.unwrap().is_none());

        storage.set("a", "1".to_string()).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));

        storage.remove("a").await.unwrap();
        assert!(storage.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.json");

        let storage = JsonFileStorage::new(&path);
        assert!(storage.get("summaries").await.unwrap().is_none());

        storage
            .set("summaries", "{\"x\":1}".to_string())
            .await
            .unwrap();

        // A fresh instance over the same path sees the value.
        let reopened = JsonFileStorage::new(&path);
        assert_eq!(
            reopened.get("summaries").await.unwrap().as_deref(),
            Some("{\"x\":1}")
        );

        reopened.remove("summaries").await.unwrap();
        assert!(reopened.get("summaries").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_multiple_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join("store.json"));

        storage.set("a", "1".to_string()).await.unwrap();
        storage.set("b", "2".to_string()).await.unwrap();

        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
