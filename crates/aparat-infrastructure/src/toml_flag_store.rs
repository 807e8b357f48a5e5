//! TOML-backed durable flag store.
//!
//! Flags live in `flags.toml` as a single table:
//!
//! ```toml
//! [flags]
//! "aparat.uploaded" = true
//! ```

use crate::paths::{AparatPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use aparat_core::credit::FlagStore;
use aparat_core::error::{AparatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FlagDocument {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

/// Durable flag store persisted through [`AtomicTomlFile`].
///
/// Flags are cached in memory after the first load; writes go to disk on a
/// blocking thread before the cache is updated, so the cache never claims a
/// value the file does not hold.
#[derive(Clone)]
pub struct TomlFlagStore {
    cache: Arc<Mutex<Option<BTreeMap<String, bool>>>>,
    file: Arc<AtomicTomlFile<FlagDocument>>,
}

impl TomlFlagStore {
    /// Uses `flags.toml` from the default (or relocated) config directory.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = AparatPaths::new(base_path).get_path(ServiceType::Flags)?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            cache: Arc::new(Mutex::new(None)),
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn load_flags(&self) -> Result<BTreeMap<String, bool>> {
        let file = self.file.clone();
        let document = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| AparatError::internal(format!("Failed to join task: {}", e)))??;
        Ok(document.unwrap_or_default().flags)
    }
}

#[async_trait::async_trait]
impl FlagStore for TomlFlagStore {
    async fn get(&self, key: &str) -> Result<bool> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load_flags().await?);
        }
        Ok(cache
            .as_ref()
            .and_then(|flags| flags.get(key).copied())
            .unwrap_or(false))
    }

    async fn set(&self, key: &str, value: bool) -> Result<()> {
        let mut cache = self.cache.lock().await;

        let file = self.file.clone();
        let key_owned = key.to_string();
        let flags = tokio::task::spawn_blocking(move || {
            file.update(FlagDocument::default(), |document| {
                document.flags.insert(key_owned, value);
                document.flags.clone()
            })
        })
        .await
        .map_err(|e| AparatError::internal(format!("Failed to join task: {}", e)))??;

        tracing::debug!(key, value, path = %self.file.path().display(), "Flag persisted");
        *cache = Some(flags);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aparat_core::credit::LOCK_FLAG_KEY;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reads_false() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlFlagStore::new(Some(temp_dir.path())).unwrap();
        assert!(!store.get(LOCK_FLAG_KEY).await.unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_set_survives_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlFlagStore::new(Some(temp_dir.path())).unwrap();
        store.set(LOCK_FLAG_KEY, true).await.unwrap();
        assert!(store.get(LOCK_FLAG_KEY).await.unwrap());

        let reopened = TomlFlagStore::new(Some(temp_dir.path())).unwrap();
        assert!(reopened.get(LOCK_FLAG_KEY).await.unwrap());

        reopened.set(LOCK_FLAG_KEY, false).await.unwrap();
        let again = TomlFlagStore::new(Some(temp_dir.path())).unwrap();
        assert!(!again.get(LOCK_FLAG_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_flags_are_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.toml");
        std::fs::write(&path, "[flags]\n\"tour.seen\" = true\n").unwrap();

        let store = TomlFlagStore::with_path(path.clone());
        store.set(LOCK_FLAG_KEY, true).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("tour.seen"));
        assert!(content.contains(LOCK_FLAG_KEY));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.toml");
        std::fs::write(&path, "[flags\n").unwrap();

        let store = TomlFlagStore::with_path(path);
        let err = store.get(LOCK_FLAG_KEY).await.unwrap_err();
        assert!(matches!(err, AparatError::Serialization { .. }));
    }
}
