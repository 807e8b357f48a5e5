//! Writes finished renders to the exports directory.

use crate::paths::{AparatPaths, ServiceType};
use aparat_core::error::Result;
use aparat_core::generation::GenerationResult;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Exports the generated image of a result as a standalone file.
#[derive(Debug, Clone)]
pub struct ResultExporter {
    dir: PathBuf,
}

impl ResultExporter {
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let dir = AparatPaths::new(base_path).get_path(ServiceType::Exports)?;
        Ok(Self::with_dir(dir))
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes the render and writes it as `render-<timestamp>-<id>.<ext>`.
    pub async fn export(&self, result: &GenerationResult) -> Result<PathBuf> {
        let bytes = result.generated_image.decode()?;
        let extension = extension_for(result.generated_image.mime_type());
        let file_name = format!(
            "render-{}-{}.{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            &uuid::Uuid::new_v4().simple().to_string()[..8],
            extension
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(
            path = %path.display(),
            bytes = bytes.len(),
            simulated = result.is_simulated,
            "Render exported"
        );
        Ok(path)
    }
}

fn extension_for(mime_type: &str) -> &str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        _ => mime_guess::get_mime_extensions_str(mime_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}
