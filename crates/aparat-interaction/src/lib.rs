//! Generation gateways for Aparat.
//!
//! [`build_gateway`] picks between the Gemini REST gateway and the simulated
//! one based on configuration and the available API key.

pub mod gemini_image_gateway;
pub mod simulated_gateway;

pub use gemini_image_gateway::GeminiImageGateway;
pub use simulated_gateway::SimulatedGateway;

use aparat_core::config::{RootConfig, SecretConfig};
use aparat_core::error::{AparatError, Result};
use aparat_core::generation::GenerationGateway;
use std::sync::Arc;

/// Selects the gateway for this run.
///
/// Simulation is used when `force_simulation` or `simulation.enabled` is set,
/// or when no API key is configured and `simulation.fallback_without_key`
/// allows it. Without a key and without the fallback this is a config error.
pub fn build_gateway(
    config: &RootConfig,
    secrets: &SecretConfig,
    force_simulation: bool,
) -> Result<Arc<dyn GenerationGateway>> {
    let simulation = &config.simulation;

    if force_simulation || simulation.enabled {
        tracing::info!(delay_ms = simulation.delay_ms, "Using simulated gateway");
        return Ok(Arc::new(SimulatedGateway::from_millis(simulation.delay_ms)));
    }

    match secrets.gemini_api_key() {
        Some(api_key) => {
            let model = secrets
                .gemini
                .as_ref()
                .and_then(|gemini| gemini.model_name.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| config.generation.model.clone());
            tracing::info!(model = %model, "Using Gemini image gateway");
            Ok(Arc::new(GeminiImageGateway::new(api_key, model)))
        }
        None if simulation.fallback_without_key => {
            tracing::warn!("No Gemini API key configured; falling back to simulated gateway");
            Ok(Arc::new(SimulatedGateway::from_millis(simulation.delay_ms)))
        }
        None => Err(AparatError::config(
            "No Gemini API key configured (set GEMINI_API_KEY or secret.json) \
             and simulation fallback is disabled",
        )),
    }
}
