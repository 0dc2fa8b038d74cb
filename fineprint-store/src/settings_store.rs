//! User settings with persistence.
//!
//! Settings control caching, risk display, and the model provider
//! configuration (credential pool, user key, rate-limit window).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Environment variable consulted for the user API key when the settings
/// file does not name another one.
pub const DEFAULT_API_KEY_ENV: &str = "FINEPRINT_API_KEY";

// ============================================================================
// Settings Types
// ============================================================================

/// Model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the model API.
    pub base_url: String,

    /// Model identifier sent with each request.
    pub model: String,

    /// Shared credential pool, rotated across requests.
    pub pool_keys: Vec<String>,

    /// User-provided key, used when the pool is exhausted or empty.
    pub user_api_key: Option<String>,

    /// Environment variable that overrides `user_api_key` at read time.
    pub api_key_env: Option<String>,

    /// Per-credential request ceiling within one window.
    pub max_requests: u32,

    /// Rate-limit window in seconds.
    pub window_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            pool_keys: Vec::new(),
            user_api_key: None,
            api_key_env: None,
            max_requests: 15,
            window_secs: 60,
        }
    }
}

impl ProviderSettings {
    /// The environment variable consulted for the user key.
    pub fn key_env_name(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// Resolves the user key; the environment variable wins over the
    /// stored value.
    pub fn resolve_user_key(&self) -> Option<String> {
        match std::env::var(self.key_env_name()) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => self.user_api_key.clone(),
        }
    }

    /// The rate-limit window as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// User preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether generated summaries are cached.
    pub cache_enabled: bool,

    /// Cache entry lifetime in days.
    pub cache_expiry_days: u32,

    /// Risk score above which output flags a document as high risk.
    pub risk_threshold: f32,

    /// Model provider configuration.
    pub provider: ProviderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_expiry_days: 30,
            risk_threshold: 0.5,
            provider: ProviderSettings::default(),
        }
    }
}

impl Settings {
    /// Cache entry lifetime as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_expiry_days) * 24 * 60 * 60)
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings, without touching disk.
    pub fn new(path: PathBuf) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        let (notify, _) = watch::channel(0);
        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        })
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// The file this store persists to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Whether summaries are cached.
    pub async fn cache_enabled(&self) -> bool {
        self.settings.read().await.cache_enabled
    }

    /// Enables or disables summary caching.
    pub async fn set_cache_enabled(&self, enabled: bool) {
        self.update(|s| s.cache_enabled = enabled).await;
    }

    /// Gets the provider configuration.
    pub async fn provider(&self) -> ProviderSettings {
        self.settings.read().await.provider.clone()
    }

    /// Sets the user API key.
    pub async fn set_user_api_key(&self, key: Option<String>) {
        self.update(|s| s.provider.user_api_key = key).await;
    }

    /// Gets the risk display threshold.
    pub async fn risk_threshold(&self) -> f32 {
        self.settings.read().await.risk_threshold
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.cache_enabled);
        assert_eq!(settings.cache_expiry_days, 30);
        assert!((settings.risk_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.provider.max_requests, 15);
        assert_eq!(settings.provider.window_secs, 60);
        assert!(settings.provider.pool_keys.is_empty());
        assert_eq!(settings.provider.key_env_name(), DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn test_cache_ttl_conversion() {
        let settings = Settings {
            cache_expiry_days: 1,
            ..Settings::default()
        };
        assert_eq!(settings.cache_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_resolve_user_key_falls_back_to_stored() {
        // The override variable is not set in the test environment, so
        // the stored key is used.
        let provider = ProviderSettings {
            user_api_key: Some("sk-stored".to_string()),
            api_key_env: Some("FINEPRINT_TEST_UNSET_KEY_VAR".to_string()),
            ..ProviderSettings::default()
        };
        assert_eq!(provider.resolve_user_key().as_deref(), Some("sk-stored"));
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let store = SettingsStore::new(PathBuf::from("/tmp/fineprint-test-settings.json"));
        let mut rx = store.subscribe();

        store.set_cache_enabled(false).await;
        assert!(rx.changed().await.is_ok());
        assert!(!store.cache_enabled().await);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone());
        store
            .update(|s| {
                s.cache_expiry_days = 7;
                s.provider.pool_keys = vec!["sk-a".to_string(), "sk-b".to_string()];
            })
            .await;
        store.save().await.unwrap();

        let reloaded = SettingsStore::load(path).await.unwrap();
        let settings = reloaded.get().await;
        assert_eq!(settings.cache_expiry_days, 7);
        assert_eq!(settings.provider.pool_keys.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(temp_dir.path().join("absent.json"))
            .await
            .unwrap();
        assert!(store.get().await.cache_enabled);
    }
}
