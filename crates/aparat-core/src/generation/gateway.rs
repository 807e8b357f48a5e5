//! Generation gateway trait.

use async_trait::async_trait;

use super::model::{GeneratedImage, GenerationRequest};
use crate::error::Result;

/// External image-synthesis capability.
///
/// Implementations report every failure, including a response without a
/// usable image, as `AparatError::Gateway`.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether renders from this gateway are echoes rather than real output.
    fn is_simulated(&self) -> bool {
        false
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GeneratedImage>;
}
