//! Asset ingestion: file input → data URI.

use chrono::Utc;

use super::data_uri::DataUri;
use super::model::{RawFile, UploadedAsset};
use super::source::AssetSource;
use crate::error::{AparatError, Result};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Reads the source and wraps it into an [`UploadedAsset`].
///
/// Apart from the read itself this is a pure transformation; any read failure
/// surfaces as `AparatError::Read` carrying the source's display name.
pub async fn ingest(source: &dyn AssetSource) -> Result<UploadedAsset> {
    let name = source.display_name();
    let raw = source.read().await.map_err(|err| match err {
        AparatError::Read { .. } => err,
        other => AparatError::read(name.clone(), other.to_string()),
    })?;
    ingest_raw(raw)
}

/// Wraps bytes that have already been read.
pub fn ingest_raw(raw: RawFile) -> Result<UploadedAsset> {
    if raw.bytes.is_empty() {
        return Err(AparatError::read(raw.name, "file is empty"));
    }

    let mime_type = raw
        .mime_type
        .filter(|mime| is_media_type(mime) && mime != FALLBACK_MIME_TYPE)
        .or_else(|| sniff_image_mime(&raw.bytes).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

    Ok(UploadedAsset {
        display_name: raw.name,
        content: DataUri::encode(mime_type, &raw.bytes),
        captured_at: Utc::now().timestamp_millis(),
    })
}

/// Accepts a bare `type/subtype` token; parameters and separators are refused
/// so the value cannot break the `data:` header it ends up in.
fn is_media_type(value: &str) -> bool {
    let token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    matches!(value.split_once('/'), Some((kind, sub)) if token(kind) && token(sub))
}

/// Recognizes the image container formats a phone camera produces.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => Some("image/heic"),
        _ => None,
    }
}
