//! Durable JSON state.
//!
//! All persisted state (settings, the summary cache) lives in JSON files
//! under the platform config and cache directories. Writes are atomic
//! (temp file + rename) and, on Unix, files end up owner-only readable
//! because the settings file can contain API keys.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Owner read/write; the settings file may hold API keys.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Owner-only directory access.
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// macOS gets `~/Library/Application Support/Fineprint`; elsewhere the
/// platform config dir plus `fineprint` (`~/.config/fineprint` on Linux).
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("Fineprint"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("fineprint"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default cache directory.
///
/// macOS gets `~/Library/Caches/Fineprint`; elsewhere the platform cache
/// dir plus `fineprint` (`~/.cache/fineprint` on Linux).
pub fn default_cache_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Caches").join("Fineprint"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|c| c.join("fineprint"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Returns the default summary cache file path.
pub fn default_cache_path() -> PathBuf {
    default_cache_dir().join("summaries.json")
}

// ============================================================================
// Permissions
// ============================================================================

#[cfg(unix)]
async fn chmod(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;
    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Restricted permissions");
    Ok(())
}

#[cfg(unix)]
async fn restrict_file(path: &Path) -> Result<(), StoreError> {
    chmod(path, FILE_MODE).await
}

#[cfg(unix)]
async fn restrict_dir(path: &Path) -> Result<(), StoreError> {
    chmod(path, DIR_MODE).await
}

#[cfg(not(unix))]
async fn restrict_file(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_dir(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Ensures a directory exists, restricting it to the owner when created.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when the directory cannot be created or its
/// permissions cannot be set.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        restrict_dir(path).await?;
    }
    Ok(())
}

/// Serializes `data` as pretty JSON and writes it to `path` atomically.
///
/// Missing parent directories are created first. The content goes to a
/// sibling temp file which is then renamed over the target, so readers
/// never observe a half-written file. On Unix the result is owner-only
/// readable.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] when `data` cannot be serialized
/// and [`StoreError::Io`] when any filesystem step fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    restrict_file(path).await?;

    debug!(path = %path.display(), bytes = json.len(), "Saved JSON file");
    Ok(())
}

/// Reads and deserializes the JSON file at `path`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when the file cannot be read (including when
/// it does not exist) and [`StoreError::Serialization`] when its content is
/// not valid JSON for `T`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "Loaded JSON file");
    Ok(data)
}

/// Like [`load_json`], but falls back to `T::default()` on any failure.
///
/// A missing file is the normal first-run case and stays silent; anything
/// else (corrupt JSON, permission trouble) is logged before falling back.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !matches!(e, StoreError::Io(_)) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dirs_are_nonempty() {
        assert!(!default_config_dir().as_os_str().is_empty());
        assert!(!default_cache_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_default_file_paths() {
        assert!(default_settings_path().ends_with("settings.json"));
        assert!(default_cache_path().ends_with("summaries.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("state").join("test.json");

        save_json(&file, &serde_json::json!({"k": 1})).await.unwrap();

        let file_mode = tokio::fs::metadata(&file)
            .await
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(file_mode, 0o600);

        let dir_mode = tokio::fs::metadata(file.parent().unwrap())
            .await
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }
}
