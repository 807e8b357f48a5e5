//! Filesystem file input.

use aparat_core::asset::{AssetSource, RawFile};
use aparat_core::error::{AparatError, Result};
use std::path::{Path, PathBuf};

/// Reads an asset from a local path.
///
/// The MIME type is guessed from the extension; unknown extensions are left
/// to content sniffing during ingestion.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    path: PathBuf,
}

impl FsAssetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl AssetSource for FsAssetSource {
    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    async fn read(&self) -> Result<RawFile> {
        let name = self.display_name();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AparatError::read(name.clone(), format!("{} (kind: {:?})", e, e.kind())))?;

        let mut raw = RawFile::new(name, bytes);
        if let Some(mime) = mime_guess::from_path(&self.path).first() {
            raw = raw.with_mime_type(mime.essence_str());
        }
        Ok(raw)
    }
}
