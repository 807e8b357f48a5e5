//! Configuration service implementation.
//!
//! Loads [`RootConfig`] from `config.toml`, writing a default file on first
//! use so users have something to edit.

use crate::paths::{AparatPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use aparat_core::config::RootConfig;
use aparat_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Clone)]
pub struct ConfigService {
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
    file: Arc<AtomicTomlFile<RootConfig>>,
}

impl ConfigService {
    /// Uses `config.toml` from the default (or relocated) config directory.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = AparatPaths::new(base_path).get_path(ServiceType::Config)?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    fn load_config(&self) -> Result<RootConfig> {
        match self.file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = RootConfig::default();
                self.file.save(&default_config)?;
                tracing::info!(path = %self.file.path().display(), "Created default config");
                Ok(default_config)
            }
        }
    }
}
