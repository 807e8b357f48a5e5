//! Demo-mode gateway.

use aparat_core::error::{AparatError, Result};
use aparat_core::generation::{GeneratedImage, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use std::time::Duration;

/// Echoes the uploaded image back after a fixed delay.
///
/// Stands in for the real gateway when no API key is configured, so the
/// full session flow (including credit consumption) can be exercised offline.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

#[async_trait]
impl GenerationGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage> {
        if request.image.is_empty() {
            return Err(AparatError::gateway("Nothing to echo: input image is empty"));
        }

        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Simulating render");
        tokio::time::sleep(self.delay).await;

        Ok(GeneratedImage {
            bytes: request.image,
            mime_type: request.mime_type,
        })
    }
}
