//! Credential rotation under a per-key rate ceiling.
//!
//! The pool hands out shared keys round robin, each tracked against a
//! rolling request window. When the pool is saturated the user's own key
//! takes over; when everything is saturated the pool degrades to reduced
//! throughput instead of failing hard. Only a fully unconfigured pool is
//! a hard error.

use fineprint_store::ProviderSettings;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::AnalysisError;

/// Identifier of the user-supplied fallback credential.
const USER_CREDENTIAL_ID: &str = "user";

fn pool_credential_id(index: usize) -> String {
    format!("pool-{index}")
}

// ============================================================================
// Types
// ============================================================================

/// Per-credential request ceiling within a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per credential per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 15,
            window: Duration::from_secs(60),
        }
    }
}

/// One usable API credential.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Stable identifier used for usage tracking.
    pub id: String,
    /// The bearer key sent to the model API.
    pub api_key: String,
}

#[derive(Debug, Clone, Copy)]
struct KeyWindow {
    window_start: Instant,
    used: u32,
}

#[derive(Debug, Default)]
struct PoolState {
    pool: Vec<Credential>,
    fallback: Option<Credential>,
    cursor: usize,
    windows: HashMap<String, KeyWindow>,
    config: RateLimitConfig,
}

fn build_pool(keys: &[String]) -> Vec<Credential> {
    keys.iter()
        .enumerate()
        .map(|(index, key)| Credential {
            id: pool_credential_id(index),
            api_key: key.clone(),
        })
        .collect()
}

/// Checks the window for `id`, lazily resetting it when elapsed.
fn under_ceiling(
    windows: &mut HashMap<String, KeyWindow>,
    id: &str,
    now: Instant,
    config: RateLimitConfig,
) -> bool {
    let window = windows.entry(id.to_string()).or_insert(KeyWindow {
        window_start: now,
        used: 0,
    });
    if now.duration_since(window.window_start) >= config.window {
        window.window_start = now;
        window.used = 0;
    }
    window.used < config.max_requests
}

// ============================================================================
// Credential Pool
// ============================================================================

/// Rotating credential pool with user-key fallback.
pub struct CredentialPool {
    state: Mutex<PoolState>,
}

impl CredentialPool {
    /// Creates a pool over shared keys plus an optional user key.
    pub fn new(pool_keys: &[String], user_key: Option<String>, config: RateLimitConfig) -> Self {
        Self {
            state: Mutex::new(PoolState {
                pool: build_pool(pool_keys),
                fallback: user_key.map(|key| Credential {
                    id: USER_CREDENTIAL_ID.to_string(),
                    api_key: key,
                }),
                cursor: 0,
                windows: HashMap::new(),
                config,
            }),
        }
    }

    /// Creates a pool from provider settings, resolving the user key
    /// through its environment override.
    pub fn from_settings(provider: &ProviderSettings) -> Self {
        Self::new(
            &provider.pool_keys,
            provider.resolve_user_key(),
            RateLimitConfig {
                max_requests: provider.max_requests,
                window: provider.window(),
            },
        )
    }

    /// Refreshes keys and limits from settings, keeping the usage windows
    /// of credentials that survive the change.
    pub async fn sync(&self, provider: &ProviderSettings) {
        let mut state = self.state.lock().await;
        state.config = RateLimitConfig {
            max_requests: provider.max_requests,
            window: provider.window(),
        };
        state.pool = build_pool(&provider.pool_keys);
        state.fallback = provider.resolve_user_key().map(|key| Credential {
            id: USER_CREDENTIAL_ID.to_string(),
            api_key: key,
        });
        if state.pool.is_empty() {
            state.cursor = 0;
        } else {
            state.cursor %= state.pool.len();
        }

        let live: Vec<String> = state
            .pool
            .iter()
            .chain(state.fallback.iter())
            .map(|c| c.id.clone())
            .collect();
        state.windows.retain(|id, _| live.iter().any(|l| l == id));
    }

    /// Whether any credential is configured at all.
    pub async fn configured(&self) -> bool {
        let state = self.state.lock().await;
        !state.pool.is_empty() || state.fallback.is_some()
    }

    /// Selects a credential for the next request.
    ///
    /// Rotates once over the pool from the cursor; the first credential
    /// under its ceiling wins and advances the cursor. A saturated pool
    /// falls back to the user key; when everything is saturated the next
    /// rotated credential is returned anyway.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoCredentials`] only when neither pool
    /// keys nor a user key are configured.
    pub async fn acquire(&self) -> Result<Credential, AnalysisError> {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let now = Instant::now();

        if state.pool.is_empty() && state.fallback.is_none() {
            return Err(AnalysisError::NoCredentials);
        }

        // One rotation over the pool from the cursor.
        let config = state.config;
        for offset in 0..state.pool.len() {
            let idx = (state.cursor + offset) % state.pool.len();
            let id = state.pool[idx].id.clone();
            if under_ceiling(&mut state.windows, &id, now, config) {
                state.cursor = (idx + 1) % state.pool.len();
                debug!(credential = %id, "Acquired pool credential");
                return Ok(state.pool[idx].clone());
            }
        }

        // Pool saturated; try the user key.
        if let Some(fallback) = &state.fallback {
            let id = fallback.id.clone();
            if under_ceiling(&mut state.windows, &id, now, config) {
                debug!(credential = %id, "Pool saturated, using user credential");
                return Ok(fallback.clone());
            }
        }

        // Everything saturated: degrade to whatever comes next in rotation
        // rather than failing hard.
        if state.pool.is_empty() {
            match &state.fallback {
                Some(fallback) => {
                    warn!("User credential saturated, proceeding anyway");
                    return Ok(fallback.clone());
                }
                None => return Err(AnalysisError::NoCredentials),
            }
        }
        let idx = state.cursor % state.pool.len();
        state.cursor = (idx + 1) % state.pool.len();
        warn!(
            credential = %state.pool[idx].id,
            "All credentials saturated, proceeding with rotated pool key"
        );
        Ok(state.pool[idx].clone())
    }

    /// Counts one dispatched request against `id`, regardless of how the
    /// request turns out.
    pub async fn record_usage(&self, id: &str) {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let now = Instant::now();
        let config = state.config;
        let window = state.windows.entry(id.to_string()).or_insert(KeyWindow {
            window_start: now,
            used: 0,
        });
        if now.duration_since(window.window_start) >= config.window {
            window.window_start = now;
            window.used = 0;
        }
        window.used += 1;
    }

    /// Requests counted against `id` in the current window.
    pub async fn usage(&self, id: &str) -> u32 {
        let state = self.state.lock().await;
        let now = Instant::now();
        match state.windows.get(id) {
            Some(window) if now.duration_since(window.window_start) < state.config.window => {
                window.used
            }
            _ => 0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("sk-pool-{i}")).collect()
    }

    async fn acquire_and_record(pool: &CredentialPool) -> String {
        let credential = pool.acquire().await.unwrap();
        pool.record_usage(&credential.id).await;
        credential.id
    }

    #[tokio::test]
    async fn test_round_robin_rotation() {
        let pool = CredentialPool::new(&keys(4), None, RateLimitConfig::default());

        let mut order = Vec::new();
        for _ in 0..8 {
            order.push(acquire_and_record(&pool).await);
        }
        assert_eq!(
            order,
            vec!["pool-0", "pool-1", "pool-2", "pool-3", "pool-0", "pool-1", "pool-2", "pool-3"]
        );
    }

    #[tokio::test]
    async fn test_ceiling_spreads_requests_evenly() {
        let pool =
            CredentialPool::new(&keys(4), Some("sk-user".to_string()), RateLimitConfig::default());

        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..60 {
            *counts.entry(acquire_and_record(&pool).await).or_default() += 1;
        }
        for i in 0..4 {
            assert_eq!(counts[&format!("pool-{i}")], 15);
            assert_eq!(pool.usage(&format!("pool-{i}")).await, 15);
        }

        // Request 61 lands on the user key.
        assert_eq!(acquire_and_record(&pool).await, "user");
    }

    #[tokio::test]
    async fn test_saturated_pool_without_fallback_degrades() {
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let pool = CredentialPool::new(&keys(2), None, config);

        assert_eq!(acquire_and_record(&pool).await, "pool-0");
        assert_eq!(acquire_and_record(&pool).await, "pool-1");

        // Saturated, but a credential is still handed out.
        let degraded = pool.acquire().await.unwrap();
        assert!(degraded.id.starts_with("pool-"));
    }

    #[tokio::test]
    async fn test_fallback_when_pool_saturated() {
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let pool = CredentialPool::new(&keys(1), Some("sk-user".to_string()), config);

        assert_eq!(acquire_and_record(&pool).await, "pool-0");
        assert_eq!(acquire_and_record(&pool).await, "user");
    }

    #[tokio::test]
    async fn test_saturated_user_key_still_used() {
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let pool = CredentialPool::new(&[], Some("sk-user".to_string()), config);

        assert_eq!(acquire_and_record(&pool).await, "user");
        assert_eq!(acquire_and_record(&pool).await, "user");
    }

    #[tokio::test]
    async fn test_no_credentials_error() {
        let pool = CredentialPool::new(&[], None, RateLimitConfig::default());
        assert!(matches!(
            pool.acquire().await,
            Err(AnalysisError::NoCredentials)
        ));
        assert!(!pool.configured().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_elapsing() {
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let pool = CredentialPool::new(&keys(1), None, config);

        assert_eq!(acquire_and_record(&pool).await, "pool-0");
        assert_eq!(pool.usage("pool-0").await, 1);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(pool.usage("pool-0").await, 0);
        assert_eq!(acquire_and_record(&pool).await, "pool-0");
    }

    #[tokio::test]
    async fn test_sync_replaces_keys_and_keeps_windows() {
        let provider = ProviderSettings {
            pool_keys: keys(2),
            max_requests: 2,
            ..ProviderSettings::default()
        };
        let pool = CredentialPool::from_settings(&provider);

        acquire_and_record(&pool).await;
        assert_eq!(pool.usage("pool-0").await, 1);

        let narrowed = ProviderSettings {
            pool_keys: keys(1),
            max_requests: 2,
            ..ProviderSettings::default()
        };
        pool.sync(&narrowed).await;

        // pool-0 survives with its window; pool-1 is gone.
        assert_eq!(pool.usage("pool-0").await, 1);
        assert_eq!(acquire_and_record(&pool).await, "pool-0");
        assert_eq!(pool.usage("pool-0").await, 2);
        assert_eq!(pool.usage("pool-1").await, 0);
    }
}
