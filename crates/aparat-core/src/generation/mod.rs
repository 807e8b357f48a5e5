//! Generation gateway contract.

pub mod gateway;
pub mod model;

pub use gateway::GenerationGateway;
pub use model::{AspectRatio, GeneratedImage, GenerationRequest, GenerationResult};
