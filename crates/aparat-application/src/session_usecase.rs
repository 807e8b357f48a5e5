//! Session use case.
//!
//! Drives the pure session state machine and carries out its effects:
//! ingestion, the gateway call and credit persistence.

use aparat_core::asset::{AssetSource, UploadedAsset, ingest};
use aparat_core::config::GenerationConfig;
use aparat_core::credit::{CreditGate, FlagStore};
use aparat_core::error::{AparatError, Result};
use aparat_core::generation::{GenerationGateway, GenerationRequest, GenerationResult};
use aparat_core::session::{
    DetailModule, Effect, Notice, Session, SessionEvent, Transition, transition,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Owns one studio session and its credit gate.
///
/// The session mutex is only held while a transition is computed and its
/// credit effects are applied. Ingestion and the gateway call run without
/// it, so concurrent submits observe `is_generating` and are rejected with
/// [`AparatError::Busy`] instead of queueing.
pub struct SessionUseCase {
    session: Arc<Mutex<Session>>,
    credit_gate: Mutex<CreditGate>,
    gateway: Arc<dyn GenerationGateway>,
    generation: GenerationConfig,
}

impl SessionUseCase {
    /// Creates a use case in the Landing state with one credit.
    ///
    /// Call [`SessionUseCase::init`] before use to honour a persisted lock.
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        flag_store: Arc<dyn FlagStore>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            credit_gate: Mutex::new(CreditGate::new(flag_store)),
            gateway,
            generation,
        }
    }

    /// Loads the durable lock into the session's credits.
    pub async fn init(&self) -> Result<Session> {
        let mut session = self.session.lock().await;
        let mut gate = self.credit_gate.lock().await;
        gate.init().await?;
        session.credits = gate.credits();

        tracing::info!(
            credits = session.credits,
            gateway = self.gateway.name(),
            "Session initialized"
        );
        Ok(session.clone())
    }

    /// Returns a copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    pub fn is_simulated(&self) -> bool {
        self.gateway.is_simulated()
    }

    /// Reads the durable lock directly from the flag store.
    pub async fn is_persistently_locked(&self) -> Result<bool> {
        self.credit_gate.lock().await.is_persistently_locked().await
    }

    /// Landing -> Hub.
    pub async fn start(&self) -> Result<Session> {
        self.apply_checked(SessionEvent::Start).await
    }

    /// Landing -> Hub; a no-op on any other screen.
    pub async fn navigate(&self) -> Session {
        self.apply(SessionEvent::Navigate).await.session
    }

    pub async fn open_detail(&self, module: DetailModule) -> Session {
        self.apply(SessionEvent::OpenDetail { module }).await.session
    }

    pub async fn close_detail(&self) -> Session {
        self.apply(SessionEvent::CloseDetail).await.session
    }

    /// Result -> Hub, dropping the result but keeping credits.
    pub async fn return_to_hub(&self) -> Result<Session> {
        self.apply_checked(SessionEvent::ReturnToHub).await
    }

    /// Back to Landing with the allowance restored and the lock cleared.
    ///
    /// Rejected with [`AparatError::Busy`] while a generation is in flight.
    pub async fn reset(&self) -> Result<Session> {
        self.apply_checked(SessionEvent::Reset).await
    }

    /// Ingests `source`, renders it and moves the session to Result.
    ///
    /// Guard rejections (`Busy`, `Exhausted`, wrong screen) leave the session
    /// untouched and never reach the gateway. Read, gateway and timeout
    /// failures return the session to an idle Hub with credits unchanged,
    /// and so does dropping the returned future before it completes.
    pub async fn submit(&self, source: &dyn AssetSource) -> Result<GenerationResult> {
        let dispatched = self.apply(SessionEvent::SubmitAsset).await;
        rejection(&dispatched)?;
        if !dispatched.dispatches() {
            return Err(AparatError::internal("Submit accepted without dispatch"));
        }
        let in_flight = InFlightGuard::new(Arc::clone(&self.session));

        let outcome = match self.run_generation(source).await {
            Ok(result) => {
                self.apply(SessionEvent::GenerationSucceeded {
                    result: result.clone(),
                })
                .await;
                Ok(result)
            }
            Err(err) => {
                let reason = err.to_string();
                let event = match err {
                    AparatError::Read { .. } => SessionEvent::IngestFailed { reason },
                    _ => SessionEvent::GenerationFailed { reason },
                };
                self.apply(event).await;
                Err(err)
            }
        };
        in_flight.disarm();
        outcome
    }

    async fn run_generation(&self, source: &dyn AssetSource) -> Result<GenerationResult> {
        let asset = ingest(source).await?;
        tracing::info!(
            name = %asset.display_name,
            mime_type = asset.mime_type(),
            bytes = asset.content.decoded_len(),
            "Asset ingested"
        );

        let request = self.build_request(&asset)?;
        let image = self.call_gateway(request).await?;

        Ok(GenerationResult {
            generated_image: image.to_data_uri(),
            source_image: asset.content,
            label: self.generation.label.clone(),
            is_simulated: self.gateway.is_simulated(),
        })
    }

    fn build_request(&self, asset: &UploadedAsset) -> Result<GenerationRequest> {
        let image = asset
            .content
            .decode()
            .map_err(|e| AparatError::read(asset.display_name.clone(), e.to_string()))?;

        Ok(GenerationRequest {
            image,
            mime_type: asset.mime_type().to_string(),
            prompt: self.generation.prompt.clone(),
            aspect_ratio: self.generation.aspect_ratio,
        })
    }

    async fn call_gateway(
        &self,
        request: GenerationRequest,
    ) -> Result<aparat_core::generation::GeneratedImage> {
        let secs = self.generation.timeout_secs;
        if secs == 0 {
            return self.gateway.generate(request).await;
        }

        match tokio::time::timeout(Duration::from_secs(secs), self.gateway.generate(request)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(AparatError::Timeout { secs }),
        }
    }

    async fn apply_checked(&self, event: SessionEvent) -> Result<Session> {
        let applied = self.apply(event).await;
        rejection(&applied)?;
        Ok(applied.session)
    }

    /// Runs one transition and applies its credit effects under the lock.
    async fn apply(&self, event: SessionEvent) -> Transition {
        let kind = event.kind();
        let mut session = self.session.lock().await;
        let from = session.screen;
        let applied = transition(&session, event);
        *session = applied.session.clone();

        for effect in &applied.effects {
            match effect {
                Effect::ConsumeCredit => {
                    let mut gate = self.credit_gate.lock().await;
                    if let Err(e) = gate.consume().await {
                        tracing::warn!(error = %e, "Failed to persist generation lock");
                    }
                }
                Effect::ResetCredit => {
                    let mut gate = self.credit_gate.lock().await;
                    if let Err(e) = gate.reset().await {
                        tracing::warn!(error = %e, "Failed to clear generation lock");
                    }
                }
                Effect::Notify(notice) => log_notice(kind, notice),
                Effect::Dispatch => {}
            }
        }

        if from != session.screen {
            tracing::info!(event = kind, from = %from, to = %session.screen, "Screen changed");
        } else {
            tracing::debug!(
                event = kind,
                screen = %session.screen,
                generating = session.is_generating,
                "Event applied"
            );
        }

        applied
    }
}

/// Clears `is_generating` when a dispatched submit is dropped before its
/// completion event is applied.
struct InFlightGuard {
    session: Arc<Mutex<Session>>,
    armed: bool,
}

impl InFlightGuard {
    fn new(session: Arc<Mutex<Session>>) -> Self {
        Self {
            session,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Submit dropped mid-flight; returning the session to the hub");

        // Completion events carry no credit effects, so the guard only
        // needs the session lock.
        if let Ok(mut session) = self.session.try_lock() {
            *session = transition(&session, cancelled()).session;
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move {
                    let mut session = session.lock().await;
                    *session = transition(&session, cancelled()).session;
                });
            }
            Err(_) => tracing::error!("No runtime to release the cancelled submit"),
        }
    }
}

fn cancelled() -> SessionEvent {
    SessionEvent::GenerationFailed {
        reason: "cancelled".to_string(),
    }
}

fn log_notice(event: &str, notice: &Notice) {
    match notice {
        Notice::Exhausted | Notice::Busy | Notice::Ignored { .. } => {
            tracing::warn!(event, notice = ?notice, "Event rejected");
        }
        Notice::GenerationFailed { reason } | Notice::ReadFailed { reason } => {
            tracing::warn!(event, reason = %reason, "Generation failed");
        }
    }
}

/// Maps a guard rejection in `applied` to its error.
fn rejection(applied: &Transition) -> Result<()> {
    for notice in applied.notices() {
        match notice {
            Notice::Exhausted => return Err(AparatError::Exhausted),
            Notice::Busy => return Err(AparatError::Busy),
            Notice::Ignored { event } => {
                return Err(AparatError::InvalidTransition(format!(
                    "'{}' is not available on the {} screen",
                    event, applied.session.screen
                )));
            }
            Notice::GenerationFailed { .. } | Notice::ReadFailed { .. } => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aparat_core::asset::RawFile;
    use aparat_core::generation::GeneratedImage;
    use aparat_core::session::Screen;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MemoryFlags(StdMutex<HashMap<String, bool>>);

    #[async_trait::async_trait]
    impl FlagStore for MemoryFlags {
        async fn get(&self, key: &str) -> Result<bool> {
            Ok(*self.0.lock().unwrap().get(key).unwrap_or(&false))
        }

        async fn set(&self, key: &str, value: bool) -> Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }

    struct EchoGateway;

    #[async_trait::async_trait]
    impl GenerationGateway for EchoGateway {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage> {
            Ok(GeneratedImage {
                bytes: request.image.into_iter().rev().collect(),
                mime_type: "image/png".to_string(),
            })
        }
    }

    struct StuckGateway;

    #[async_trait::async_trait]
    impl GenerationGateway for StuckGateway {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn generate(&self, _request: GenerationRequest) -> Result<GeneratedImage> {
            std::future::pending::<Result<GeneratedImage>>().await
        }
    }

    fn use_case(gateway: Arc<dyn GenerationGateway>, timeout_secs: u64) -> SessionUseCase {
        let generation = GenerationConfig {
            timeout_secs,
            ..GenerationConfig::default()
        };
        SessionUseCase::new(gateway, Arc::new(MemoryFlags::default()), generation)
    }

    fn photo() -> RawFile {
        RawFile::new("mug.jpg", vec![1, 2, 3]).with_mime_type("image/jpeg")
    }

    #[tokio::test]
    async fn test_submit_builds_result_from_gateway_output() {
        let uc = use_case(Arc::new(EchoGateway), 60);
        uc.init().await.unwrap();
        uc.start().await.unwrap();

        let result = uc.submit(&photo()).await.unwrap();

        assert_eq!(result.generated_image.decode().unwrap(), vec![3, 2, 1]);
        assert_eq!(result.source_image.decode().unwrap(), vec![1, 2, 3]);
        assert_eq!(result.source_image.mime_type(), "image/jpeg");
        assert_eq!(result.label, "8K MASTER");
        assert!(!result.is_simulated);

        let session = uc.snapshot().await;
        assert_eq!(session.screen, Screen::Result);
        assert_eq!(session.credits, 0);
        assert!(uc.is_persistently_locked().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_releases_guard_and_keeps_credit() {
        let uc = use_case(Arc::new(StuckGateway), 5);
        uc.init().await.unwrap();
        uc.start().await.unwrap();

        let err = uc.submit(&photo()).await.unwrap_err();
        assert_eq!(err, AparatError::Timeout { secs: 5 });

        let session = uc.snapshot().await;
        assert_eq!(session.screen, Screen::Hub);
        assert!(!session.is_generating);
        assert_eq!(session.credits, 1);
        assert!(!uc.is_persistently_locked().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_releases_guard() {
        let uc = use_case(Arc::new(StuckGateway), 0);
        uc.init().await.unwrap();
        uc.start().await.unwrap();

        let abandoned = tokio::time::timeout(Duration::from_millis(20), uc.submit(&photo())).await;
        assert!(abandoned.is_err());

        let session = uc.snapshot().await;
        assert_eq!(session.screen, Screen::Hub);
        assert!(!session.is_generating);
        assert_eq!(session.credits, 1);
        assert!(!uc.is_persistently_locked().await.unwrap());

        assert_eq!(uc.reset().await.unwrap().screen, Screen::Landing);
    }

    #[tokio::test]
    async fn test_empty_file_is_read_error() {
        let uc = use_case(Arc::new(EchoGateway), 60);
        uc.start().await.unwrap();

        let err = uc.submit(&RawFile::new("empty.png", Vec::new())).await.unwrap_err();
        assert!(matches!(err, AparatError::Read { .. }));

        let session = uc.snapshot().await;
        assert_eq!(session.screen, Screen::Hub);
        assert!(!session.is_generating);
        assert_eq!(session.credits, 1);
    }

    #[tokio::test]
    async fn test_submit_from_landing_is_invalid() {
        let uc = use_case(Arc::new(EchoGateway), 60);
        let err = uc.submit(&photo()).await.unwrap_err();
        assert!(matches!(err, AparatError::InvalidTransition(_)));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_detail_overlay_is_screen_independent() {
        let uc = use_case(Arc::new(EchoGateway), 60);
        let session = uc.open_detail(DetailModule::BrandLab).await;
        assert_eq!(session.screen, Screen::Landing);
        assert_eq!(session.active_detail, Some(DetailModule::BrandLab));

        assert_eq!(uc.navigate().await.screen, Screen::Hub);
        assert_eq!(uc.close_detail().await.active_detail, None);
        // Navigate elsewhere is a no-op
        assert_eq!(uc.navigate().await.screen, Screen::Hub);
    }
}
