//! End-to-end session flows against real stores and gateways.

use aparat_application::SessionUseCase;
use aparat_core::asset::RawFile;
use aparat_core::config::{GenerationConfig, RootConfig, SecretConfig};
use aparat_core::credit::FlagStore;
use aparat_core::error::{AparatError, Result};
use aparat_core::generation::{GeneratedImage, GenerationGateway, GenerationRequest};
use aparat_core::session::Screen;
use aparat_infrastructure::{FsAssetSource, InMemoryFlagStore, TomlFlagStore};
use aparat_interaction::{SimulatedGateway, build_gateway};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Returns a fixed image and counts calls.
struct FixedGateway {
    output: Vec<u8>,
    calls: AtomicUsize,
}

impl FixedGateway {
    fn new(output: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            output: output.to_vec(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationGateway for FixedGateway {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedImage {
            bytes: self.output.clone(),
            mime_type: "image/png".to_string(),
        })
    }
}

struct FailingGateway;

#[async_trait]
impl GenerationGateway for FailingGateway {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<GeneratedImage> {
        Err(AparatError::gateway("Signal lost"))
    }
}

/// Blocks until released, so a generation can be held in flight.
struct GatedGateway {
    release: Notify,
    entered: Notify,
}

#[async_trait]
impl GenerationGateway for GatedGateway {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(GeneratedImage {
            bytes: request.image,
            mime_type: request.mime_type,
        })
    }
}

fn photo() -> RawFile {
    RawFile::new("bottle.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 10, 20, 30])
}

async fn started(gateway: Arc<dyn GenerationGateway>, store: Arc<dyn FlagStore>) -> SessionUseCase {
    let uc = SessionUseCase::new(gateway, store, GenerationConfig::default());
    uc.init().await.unwrap();
    uc.start().await.unwrap();
    uc
}

#[tokio::test]
async fn test_successful_render_consumes_credit() {
    let gateway = FixedGateway::new(b"rendered");
    let store = Arc::new(InMemoryFlagStore::new());
    let uc = started(gateway.clone(), store.clone()).await;

    let result = uc.submit(&photo()).await.unwrap();

    assert_eq!(result.generated_image.decode().unwrap(), b"rendered".to_vec());
    assert_eq!(result.source_image.mime_type(), "image/jpeg");
    let session = uc.snapshot().await;
    assert_eq!(session.screen, Screen::Result);
    assert_eq!(session.credits, 0);
    assert!(!session.is_generating);
    assert_eq!(session.result, Some(result));
    assert!(uc.is_persistently_locked().await.unwrap());
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_gateway_failure_keeps_credit() {
    let store = Arc::new(InMemoryFlagStore::new());
    let uc = started(Arc::new(FailingGateway), store).await;

    let err = uc.submit(&photo()).await.unwrap_err();
    assert!(err.is_generation_failure());

    let session = uc.snapshot().await;
    assert_eq!(session.screen, Screen::Hub);
    assert!(!session.is_generating);
    assert_eq!(session.credits, 1);
    assert!(session.result.is_none());
    assert!(!uc.is_persistently_locked().await.unwrap());
}

#[tokio::test]
async fn test_exhausted_session_never_calls_gateway() {
    let gateway = FixedGateway::new(b"x");
    let store = Arc::new(InMemoryFlagStore::new());
    let uc = started(gateway.clone(), store).await;

    uc.submit(&photo()).await.unwrap();
    uc.return_to_hub().await.unwrap();
    let before = uc.snapshot().await;
    assert_eq!(before.credits, 0);

    let err = uc.submit(&photo()).await.unwrap_err();
    assert_eq!(err, AparatError::Exhausted);
    assert_eq!(uc.snapshot().await, before);
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_simulated_render_follows_same_path() {
    let store = Arc::new(InMemoryFlagStore::new());
    let uc = started(Arc::new(SimulatedGateway::from_millis(1500)), store).await;
    let begin = tokio::time::Instant::now();

    let result = uc.submit(&photo()).await.unwrap();

    assert!(begin.elapsed() >= Duration::from_millis(1500));
    assert!(result.is_simulated);
    assert_eq!(result.generated_image, result.source_image);
    let session = uc.snapshot().await;
    assert_eq!(session.screen, Screen::Result);
    assert_eq!(session.credits, 0);
}

#[tokio::test]
async fn test_fallback_gateway_without_key_is_simulated() {
    let mut config = RootConfig::default();
    config.simulation.delay_ms = 0;
    let gateway = build_gateway(&config, &SecretConfig::default(), false).unwrap();
    let uc = started(gateway, Arc::new(InMemoryFlagStore::new())).await;

    assert!(uc.is_simulated());
    assert!(uc.submit(&photo()).await.unwrap().is_simulated);
}

#[tokio::test]
async fn test_concurrent_submit_is_rejected_busy() {
    let gateway = Arc::new(GatedGateway {
        release: Notify::new(),
        entered: Notify::new(),
    });
    let uc = Arc::new(started(gateway.clone(), Arc::new(InMemoryFlagStore::new())).await);

    let first = {
        let uc = uc.clone();
        tokio::spawn(async move { uc.submit(&photo()).await })
    };
    gateway.entered.notified().await;

    assert!(uc.snapshot().await.is_generating);
    assert_eq!(uc.submit(&photo()).await.unwrap_err(), AparatError::Busy);
    assert_eq!(uc.reset().await.unwrap_err(), AparatError::Busy);

    gateway.release.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.generated_image.decode().unwrap(), photo().bytes);

    let session = uc.snapshot().await;
    assert_eq!(session.screen, Screen::Result);
    assert_eq!(session.credits, 0);
}

#[tokio::test]
async fn test_reset_clears_result_and_lock() {
    let gateway = FixedGateway::new(b"first");
    let uc = started(gateway.clone(), Arc::new(InMemoryFlagStore::new())).await;
    uc.submit(&photo()).await.unwrap();

    let session = uc.reset().await.unwrap();
    assert_eq!(session.screen, Screen::Landing);
    assert!(session.result.is_none());
    assert_eq!(session.credits, 1);
    assert!(!uc.is_persistently_locked().await.unwrap());

    uc.start().await.unwrap();
    uc.submit(&photo()).await.unwrap();
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn test_lock_survives_restart_with_toml_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flags.toml");

    {
        let store = Arc::new(TomlFlagStore::with_path(path.clone()));
        let uc = started(FixedGateway::new(b"x"), store).await;
        uc.submit(&photo()).await.unwrap();
    }

    let gateway = FixedGateway::new(b"y");
    let store = Arc::new(TomlFlagStore::with_path(path.clone()));
    let uc = started(gateway.clone(), store).await;
    assert_eq!(uc.snapshot().await.credits, 0);
    assert_eq!(uc.submit(&photo()).await.unwrap_err(), AparatError::Exhausted);
    assert_eq!(gateway.calls(), 0);

    uc.reset().await.unwrap();
    let store = Arc::new(TomlFlagStore::with_path(path));
    let fresh = started(FixedGateway::new(b"z"), store).await;
    assert_eq!(fresh.snapshot().await.credits, 1);
}

#[tokio::test]
async fn test_upload_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shot.webp");
    std::fs::write(&path, b"RIFF\0\0\0\0WEBPVP8 ").unwrap();

    let uc = started(FixedGateway::new(b"out"), Arc::new(InMemoryFlagStore::new())).await;
    let result = uc.submit(&FsAssetSource::new(&path)).await.unwrap();
    assert_eq!(result.source_image.mime_type(), "image/webp");

    let missing = temp_dir.path().join("missing.png");
    uc.reset().await.unwrap();
    uc.start().await.unwrap();
    let err = uc.submit(&FsAssetSource::new(missing)).await.unwrap_err();
    assert!(matches!(err, AparatError::Read { .. }));
    assert_eq!(uc.snapshot().await.credits, 1);
}
