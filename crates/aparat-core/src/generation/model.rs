//! Generation request and result models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::asset::DataUri;
use crate::error::AparatError;

/// Output framing supported by the studio: square feed posts, vertical
/// stories/reels and horizontal ads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = AparatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "9:16" => Ok(AspectRatio::Portrait),
            "16:9" => Ok(AspectRatio::Landscape),
            other => Err(AparatError::config(format!(
                "unsupported aspect ratio '{other}' (expected 1:1, 9:16 or 16:9)"
            ))),
        }
    }
}

/// What the gateway is asked to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Raw image bytes returned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> DataUri {
        DataUri::encode(self.mime_type.clone(), &self.bytes)
    }
}

/// The render shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub generated_image: DataUri,
    pub source_image: DataUri,
    /// Badge displayed next to the render
    pub label: String,
    /// True when the render is an echo from the simulated gateway
    pub is_simulated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse_and_display() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert_eq!(AspectRatio::Landscape.to_string(), "16:9");
        assert_eq!(AspectRatio::default(), AspectRatio::Square);
        assert!("4:3".parse::<AspectRatio>().unwrap_err().is_config());
    }

    #[test]
    fn test_aspect_ratio_serde_uses_ratio_strings() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");
    }

    #[test]
    fn test_generated_image_data_uri() {
        let image = GeneratedImage {
            bytes: vec![9, 8, 7],
            mime_type: "image/png".to_string(),
        };
        let uri = image.to_data_uri();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.decode().unwrap(), vec![9, 8, 7]);
    }
}
