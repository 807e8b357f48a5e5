//! Base64 `data:` URIs for self-contained in-memory images.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AparatError, Result};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An addressable byte blob in `data:<mime>;base64,<payload>` form.
///
/// Holds no reference to where the bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    payload: String,
}

impl DataUri {
    /// Encodes raw bytes under the given mime type.
    pub fn encode(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decodes the payload back into the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64_STANDARD.decode(self.payload.as_bytes())?)
    }

    /// Size of the decoded payload in bytes, computed from the base64 length.
    pub fn decoded_len(&self) -> usize {
        let padding = self.payload.bytes().rev().take_while(|b| *b == b'=').count();
        (self.payload.len() / 4) * 3 - padding.min(2)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}{BASE64_MARKER}{}", self.mime_type, self.payload)
    }
}

impl FromStr for DataUri {
    type Err = AparatError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix(SCHEME).ok_or_else(|| AparatError::Serialization {
            format: "data URI".to_string(),
            message: "missing 'data:' scheme".to_string(),
        })?;
        let (mime_type, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| AparatError::Serialization {
                format: "data URI".to_string(),
                message: "only base64 data URIs are supported".to_string(),
            })?;

        let mime_type = if mime_type.is_empty() {
            "application/octet-stream"
        } else {
            mime_type
        };

        // Reject malformed payloads at the boundary
        BASE64_STANDARD.decode(payload.as_bytes())?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            payload: payload.to_string(),
        })
    }
}

impl Serialize for DataUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
