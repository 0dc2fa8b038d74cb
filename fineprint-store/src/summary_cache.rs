//! TTL + LRU result cache.
//!
//! Keeps generated summaries keyed by document URL so repeat lookups skip
//! the model round-trip. Entries age out after a TTL and the cache holds a
//! bounded number of entries, evicting the least recently accessed.
//!
//! Persistence is best effort: every storage failure is logged and treated
//! as a miss or no-op, so a broken disk never breaks summarization.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::storage::StorageBackend;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Storage key the cache serializes its entry map under.
const STORAGE_KEY: &str = "summaries";

// ============================================================================
// Entries and Stats
// ============================================================================

/// One cached payload with access metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub payload: T,
    /// When the entry was created; expiry is measured from here.
    pub created_at: DateTime<Utc>,
    /// When the entry was last returned by a lookup.
    pub last_accessed_at: DateTime<Utc>,
    /// How many lookups this entry has served.
    #[serde(default)]
    pub hit_count: u64,
}

/// Aggregate cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Live entries currently held.
    pub total_entries: usize,
    /// Hits served across all live entries.
    pub total_hits: u64,
    /// Configured maximum entry count.
    pub capacity: usize,
}

// ============================================================================
// Result Cache
// ============================================================================

/// TTL + LRU cache persisted through a [`StorageBackend`].
///
/// Generic over the payload; [`SummaryCache`] is the concrete instantiation
/// used by the pipeline. Clones share the same entries and backend.
#[derive(Clone)]
pub struct ResultCache<T> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    storage: Arc<dyn StorageBackend>,
    storage_key: String,
    ttl: Duration,
    capacity: usize,
}

/// Cache of generated document summaries, keyed by document URL.
pub type SummaryCache = ResultCache<fineprint_core::Summary>;

impl<T> ResultCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Creates a cache over `storage` with the default TTL and capacity.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            storage,
            storage_key: STORAGE_KEY.to_string(),
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Sets the entry lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum entry count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the storage key the entry map is serialized under.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Hydrates the cache from storage, pruning entries that expired
    /// while persisted. Failures leave the cache empty and usable.
    pub async fn load(&self) {
        let raw = match self.storage.get(&self.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read cache from storage, starting empty");
                return;
            }
        };

        match serde_json::from_str::<HashMap<String, CacheEntry<T>>>(&raw) {
            Ok(mut loaded) => {
                let before = loaded.len();
                loaded.retain(|_, entry| !Self::is_expired(entry, self.ttl));
                debug!(
                    entries = loaded.len(),
                    pruned = before - loaded.len(),
                    "Cache hydrated"
                );
                *self.entries.write().await = loaded;
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse cached entries, starting empty");
            }
        }
    }

    /// Looks up a cached payload.
    ///
    /// Expired entries are removed on the spot and count as misses. A hit
    /// bumps the entry's hit count and recency, and the mutation is
    /// persisted best effort.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.write().await;

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => Self::is_expired(entry, self.ttl),
        };

        if expired {
            debug!(key = key, "Cache entry expired");
            entries.remove(key);
            let snapshot = entries.clone();
            drop(entries);
            self.persist(&snapshot).await;
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.hit_count += 1;
        entry.last_accessed_at = Utc::now();
        let payload = entry.payload.clone();
        let snapshot = entries.clone();
        drop(entries);
        self.persist(&snapshot).await;

        debug!(key = key, "Cache hit");
        Some(payload)
    }

    /// Inserts a payload, evicting the least recently accessed entry when
    /// the cache is at capacity.
    pub async fn set(&self, key: impl Into<String>, payload: T) {
        let key = key.into();
        let now = Utc::now();
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(
                key.clone(),
                CacheEntry {
                    payload,
                    created_at: now,
                    last_accessed_at: now,
                    hit_count: 0,
                },
            );
            while entries.len() > self.capacity {
                Self::evict_lru(&mut entries);
            }
            entries.clone()
        };
        debug!(key = %key, entries = snapshot.len(), "Cache entry stored");
        self.persist(&snapshot).await;
    }

    /// Removes a single entry. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> bool {
        let (removed, snapshot) = {
            let mut entries = self.entries.write().await;
            let removed = entries.remove(key).is_some();
            (removed, entries.clone())
        };
        if removed {
            debug!(key = key, "Cache entry removed");
            self.persist(&snapshot).await;
        }
        removed
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.clear();
            entries.clone()
        };
        debug!("Cache cleared");
        self.persist(&snapshot).await;
    }

    /// Current aggregate counters.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            total_entries: entries.len(),
            total_hits: entries.values().map(|e| e.hit_count).sum(),
            capacity: self.capacity,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn is_expired(entry: &CacheEntry<T>, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(entry.created_at);
        age > chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
    }

    /// Removes the least recently accessed entry, breaking timestamp ties
    /// by key order so eviction is deterministic.
    fn evict_lru(entries: &mut HashMap<String, CacheEntry<T>>) {
        let victim = entries
            .iter()
            .min_by(|(key_a, a), (key_b, b)| {
                a.last_accessed_at
                    .cmp(&b.last_accessed_at)
                    .then_with(|| key_a.cmp(key_b))
            })
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            debug!(key = %key, "Evicting least recently used cache entry");
            entries.remove(&key);
        }
    }

    /// Best-effort write-through; storage failures are logged and ignored.
    async fn persist(&self, entries: &HashMap<String, CacheEntry<T>>) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache, skipping persist");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.storage_key, json).await {
            warn!(error = %e, "Failed to persist cache, continuing in memory");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    fn memory_cache() -> ResultCache<String> {
        ResultCache::new(Arc::new(MemoryStorage::new()))
    }

    /// Backend whose every operation fails.
    struct FailingStorage;

    #[async_trait]
    impl StorageBackend for FailingStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let cache = memory_cache();
        assert!(cache.get("https://example.com/terms").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_counts_and_stats() {
        let cache = memory_cache();
        cache.set("a", "payload".to_string()).await;

        assert_eq!(cache.get("a").await.as_deref(), Some("payload"));
        assert_eq!(cache.get("a").await.as_deref(), Some("payload"));

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.capacity, DEFAULT_CAPACITY);
    }

    #[tokio::test]
    async fn test_expired_entry_removed_on_lookup() {
        let cache = memory_cache().with_ttl(Duration::ZERO);
        cache.set("a", "payload".to_string()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_lru_eviction_prefers_untouched_entry() {
        let cache = memory_cache().with_capacity(2);

        cache.set("a", "1".to_string()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.set("b", "2".to_string()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Touch "a" so "b" becomes the least recently accessed.
        assert!(cache.get("a").await.is_some());
        tokio::time::sleep(Duration::from_millis(5)).await;

        cache.set("c", "3".to_string()).await;

        assert!(cache.get("a").await.is_some());
        assert!(cache.get("b").await.is_none());
        assert!(cache.get("c").await.is_some());
        assert_eq!(cache.stats().await.total_entries, 2);
    }

    #[tokio::test]
    async fn test_at_capacity_keeps_all_entries() {
        let cache = memory_cache().with_capacity(2);
        cache.set("a", "1".to_string()).await;
        cache.set("b", "2".to_string()).await;
        assert_eq!(cache.stats().await.total_entries, 2);
    }

    #[tokio::test]
    async fn test_remove_single_entry() {
        let cache = memory_cache();
        cache.set("a", "1".to_string()).await;
        cache.set("b", "2".to_string()).await;

        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let storage = Arc::new(MemoryStorage::new());
        let cache: ResultCache<String> = ResultCache::new(storage.clone());
        cache.set("a", "payload".to_string()).await;

        let reopened: ResultCache<String> = ResultCache::new(storage);
        reopened.load().await;
        assert_eq!(reopened.get("a").await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_clear_persists_empty_state() {
        let storage = Arc::new(MemoryStorage::new());
        let cache: ResultCache<String> = ResultCache::new(storage.clone());
        cache.set("a", "payload".to_string()).await;
        cache.clear().await;

        let reopened: ResultCache<String> = ResultCache::new(storage);
        reopened.load().await;
        assert!(reopened.get("a").await.is_none());
        assert_eq!(reopened.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_fail_open_on_storage_errors() {
        let cache: ResultCache<String> = ResultCache::new(Arc::new(FailingStorage));
        cache.load().await;

        // Storage is broken but the cache keeps working in memory.
        cache.set("a", "payload".to_string()).await;
        assert_eq!(cache.get("a").await.as_deref(), Some("payload"));
        assert_eq!(cache.stats().await.total_hits, 1);
    }
}
