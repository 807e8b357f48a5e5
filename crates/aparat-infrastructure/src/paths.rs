//! Unified path management for aparat files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/aparat/            # Config directory
//! ├── config.toml              # Generation and simulation settings
//! ├── secret.json              # API keys
//! └── flags.toml               # Durable flags (generation lock)
//!
//! ~/.local/share/aparat/       # Data directory
//! └── exports/                 # Exported renders
//! ```
//!
//! Passing a base directory relocates the whole tree under it, which is what
//! tests and `--data-dir` use.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "aparat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for aparat_core::AparatError {
    fn from(err: PathError) -> Self {
        aparat_core::AparatError::config(err.to_string())
    }
}

/// Files and directories owned by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Secret,
    Flags,
    Exports,
}

/// Resolves service paths, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct AparatPaths {
    base: Option<PathBuf>,
}

impl AparatPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the config directory (e.g., `~/.config/aparat/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/aparat/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        Ok(match service {
            ServiceType::Config => self.config_dir()?.join("config.toml"),
            ServiceType::Secret => self.config_dir()?.join("secret.json"),
            ServiceType::Flags => self.config_dir()?.join("flags.toml"),
            ServiceType::Exports => self.data_dir()?.join("exports"),
        })
    }
}
