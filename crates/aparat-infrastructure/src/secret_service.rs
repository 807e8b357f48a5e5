//! Secret service implementation.
//!
//! Reads the Gemini API key from `secret.json`; the `GEMINI_API_KEY`
//! environment variable takes precedence when set.

use crate::paths::{AparatPaths, ServiceType};
use aparat_core::config::{GeminiConfig, SecretConfig};
use aparat_core::error::{AparatError, Result};
use aparat_core::secret::SecretService;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Service for loading secret configuration.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    env_override: Option<String>,
}

impl SecretServiceImpl {
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = AparatPaths::new(base_path).get_path(ServiceType::Secret)?;
        Ok(Self::with_path(path))
    }

    /// Uses `path` and picks up the environment override, if any.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            env_override: std::env::var(API_KEY_ENV).ok(),
        }
    }

    /// Replaces (or removes) the environment override.
    pub fn with_env_override(mut self, api_key: Option<String>) -> Self {
        self.env_override = api_key;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty template with 600 permissions if no file exists yet.
    pub async fn ensure_secret_file(&self) -> Result<PathBuf> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(self.path.clone());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&template)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, permissions).await?;
        }

        Ok(self.path.clone())
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let mut secrets = if tokio::fs::try_exists(&self.path).await? {
            let content = tokio::fs::read_to_string(&self.path).await?;
            if content.trim().is_empty() {
                SecretConfig::default()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    AparatError::config(format!(
                        "Invalid secret file {}: {}",
                        self.path.display(),
                        e
                    ))
                })?
            }
        } else {
            SecretConfig::default()
        };

        if let Some(key) = self.env_override.as_deref().filter(|k| !k.trim().is_empty()) {
            let model_name = secrets.gemini.take().and_then(|g| g.model_name);
            secrets.gemini = Some(GeminiConfig {
                api_key: key.trim().to_string(),
                model_name,
            });
        }

        Ok(secrets)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_has_no_key() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::new(Some(temp_dir.path()))
            .unwrap()
            .with_env_override(None);

        assert!(!service.secret_file_exists().await);
        let secrets = service.load_secrets().await.unwrap();
        assert!(secrets.gemini_api_key().is_none());
    }

    #[tokio::test]
    async fn test_reads_key_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "file-key", "model_name": "m"}}"#).unwrap();

        let service = SecretServiceImpl::with_path(path).with_env_override(None);
        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("file-key"));
        assert_eq!(secrets.gemini.unwrap().model_name.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn test_env_override_wins_and_keeps_model() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "file-key", "model_name": "m"}}"#).unwrap();

        let service =
            SecretServiceImpl::with_path(path).with_env_override(Some("env-key".to_string()));
        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("env-key"));
        assert_eq!(secrets.gemini.unwrap().model_name.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn test_ensure_secret_file_writes_template() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::new(Some(temp_dir.path()))
            .unwrap()
            .with_env_override(None);

        let path = service.ensure_secret_file().await.unwrap();
        assert!(path.exists());
        assert!(service.secret_file_exists().await);

        // Template has an empty key, which counts as missing
        let secrets = service.load_secrets().await.unwrap();
        assert!(secrets.gemini_api_key().is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, "{not json").unwrap();

        let service = SecretServiceImpl::with_path(path).with_env_override(None);
        assert!(service.load_secrets().await.unwrap_err().is_config());
    }
}
