//! Configuration models.
//!
//! `config.toml` holds [`RootConfig`]; `secret.json` holds [`SecretConfig`].
//! Every field has a default so a partial file is always valid.

use serde::{Deserialize, Serialize};

use crate::generation::AspectRatio;

pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

pub const DEFAULT_STUDIO_PROMPT: &str = "Professional studio photography. High-end lighting, \
satin anthracite flow background. 8k hyper-detailed product. Isolated on professional floor.";

pub const DEFAULT_RESULT_LABEL: &str = "8K MASTER";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// How a render is requested from the gateway.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    /// Bounded wait for one gateway call; 0 disables the timeout
    pub timeout_secs: u64,
    /// Badge attached to every result
    pub label: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            prompt: DEFAULT_STUDIO_PROMPT.to_string(),
            aspect_ratio: AspectRatio::Square,
            timeout_secs: 60,
            label: DEFAULT_RESULT_LABEL.to_string(),
        }
    }
}

/// Demo mode: echo the upload back instead of calling the real gateway.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub delay_ms: u64,
    /// Use the simulated gateway when no API key is configured
    pub fallback_without_key: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 1500,
            fallback_without_key: true,
        }
    }
}

/// Root of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

impl SecretConfig {
    /// The Gemini API key, if one is configured and not blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|config| config.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}

/// Gemini API configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Overrides `generation.model` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [generation]
            aspect_ratio = "9:16"

            [simulation]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.aspect_ratio, AspectRatio::Portrait);
        assert_eq!(config.generation.model, DEFAULT_GEMINI_IMAGE_MODEL);
        assert_eq!(config.generation.timeout_secs, 60);
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.delay_ms, 1500);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "   "}}"#).unwrap();
        assert!(secrets.gemini_api_key().is_none());

        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "abc"}}"#).unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("abc"));
        assert!(SecretConfig::default().gemini_api_key().is_none());
    }
}
