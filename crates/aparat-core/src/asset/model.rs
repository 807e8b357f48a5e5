//! Uploaded asset domain models.

use serde::{Deserialize, Serialize};

use super::data_uri::DataUri;

/// Raw file handed over by a file input: display name plus bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Original filename as shown to the user
    pub name: String,
    /// Declared MIME type, if the source knows it
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A photo wrapped into a self-contained in-memory representation.
///
/// Created per upload and immutable afterwards. Owned by the generation
/// request that produced it; nothing keeps it after the request resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub display_name: String,
    pub content: DataUri,
    /// Capture timestamp (Unix milliseconds)
    pub captured_at: i64,
}

impl UploadedAsset {
    pub fn mime_type(&self) -> &str {
        self.content.mime_type()
    }
}
