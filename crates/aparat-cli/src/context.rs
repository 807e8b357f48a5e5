//! Wires configuration, stores and the gateway into a session use case.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use aparat_application::SessionUseCase;
use aparat_core::config::{RootConfig, SecretConfig};
use aparat_core::credit::{CreditGate, FlagStore};
use aparat_core::generation::GenerationGateway;
use aparat_core::secret::SecretService;
use aparat_infrastructure::{
    ConfigService, InMemoryFlagStore, ResultExporter, SecretServiceImpl, TomlFlagStore,
};
use aparat_interaction::build_gateway;

use crate::GlobalArgs;

/// Everything a command needs for one run.
///
/// The gateway is only built by commands that render, so `status` and
/// `reset` work without an API key.
pub struct AppContext {
    pub config: RootConfig,
    secrets: SecretConfig,
    simulate: bool,
    flag_store: Arc<dyn FlagStore>,
    pub exporter: ResultExporter,
    pub config_path: PathBuf,
    /// `None` when the lock lives in memory only
    pub flags_path: Option<PathBuf>,
}

impl AppContext {
    pub async fn build(args: &GlobalArgs) -> Result<Self> {
        let base = args.data_dir.as_deref();

        let config_service = match &args.config {
            Some(path) => ConfigService::with_path(path.clone()),
            None => ConfigService::new(base)?,
        };
        let config: RootConfig = config_service
            .get_config()
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

        let secret_service = SecretServiceImpl::new(base)?;
        let secrets = secret_service.load_secrets().await?;
        if secrets.gemini_api_key().is_none() && !secret_service.secret_file_exists().await {
            let path = secret_service.ensure_secret_file().await?;
            tracing::info!(
                path = %path.display(),
                "Created secret template; add your Gemini API key"
            );
        }

        let (flag_store, flags_path): (Arc<dyn FlagStore>, Option<PathBuf>) = if args.ephemeral {
            (Arc::new(InMemoryFlagStore::new()), None)
        } else {
            let store = TomlFlagStore::new(base)?;
            let path = store.path().to_path_buf();
            (Arc::new(store), Some(path))
        };

        tracing::debug!(
            config = %config_service.path().display(),
            ephemeral = args.ephemeral,
            "Application context ready"
        );

        Ok(Self {
            config,
            secrets,
            simulate: args.simulate,
            flag_store,
            exporter: ResultExporter::new(base)?,
            config_path: config_service.path().to_path_buf(),
            flags_path,
        })
    }

    /// Selects the gateway for this run.
    pub fn gateway(&self) -> aparat_core::Result<Arc<dyn GenerationGateway>> {
        build_gateway(&self.config, &self.secrets, self.simulate)
    }

    /// Builds the gateway and a session that honours the persisted lock.
    pub async fn session(&self) -> Result<Arc<SessionUseCase>> {
        let use_case = Arc::new(SessionUseCase::new(
            self.gateway()?,
            Arc::clone(&self.flag_store),
            self.config.generation.clone(),
        ));
        use_case
            .init()
            .await
            .context("Failed to read the generation lock")?;
        Ok(use_case)
    }

    /// Direct access to the lock, without a session or gateway.
    pub fn credit_gate(&self) -> CreditGate {
        CreditGate::new(Arc::clone(&self.flag_store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aparat_infrastructure::secret_service::API_KEY_ENV;
    use tempfile::TempDir;

    fn args(dir: &TempDir, simulate: bool) -> GlobalArgs {
        GlobalArgs {
            config: None,
            data_dir: Some(dir.path().to_path_buf()),
            simulate,
            ephemeral: false,
            verbose: false,
        }
    }

    fn disable_fallback(dir: &TempDir) {
        std::fs::write(
            dir.path().join("config.toml"),
            "[simulation]\nfallback_without_key = false\n",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_lock_commands_work_without_gateway() {
        let dir = TempDir::new().unwrap();
        disable_fallback(&dir);
        let mut ctx = AppContext::build(&args(&dir, false)).await.unwrap();
        ctx.secrets = SecretConfig::default();
        assert!(ctx.gateway().is_err());
        assert!(ctx.session().await.is_err());

        let mut gate = ctx.credit_gate();
        gate.consume().await.unwrap();
        assert!(ctx.credit_gate().is_persistently_locked().await.unwrap());

        ctx.credit_gate().reset().await.unwrap();
        assert!(!ctx.credit_gate().is_persistently_locked().await.unwrap());
    }

    #[tokio::test]
    async fn test_build_writes_secret_template() {
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let dir = TempDir::new().unwrap();
        AppContext::build(&args(&dir, true)).await.unwrap();
        assert!(dir.path().join("secret.json").exists());
    }

    #[tokio::test]
    async fn test_session_honours_persisted_lock() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::build(&args(&dir, true)).await.unwrap();
        ctx.credit_gate().consume().await.unwrap();

        let uc = ctx.session().await.unwrap();
        assert!(uc.is_simulated());
        assert_eq!(uc.snapshot().await.credits, 0);
    }
}
