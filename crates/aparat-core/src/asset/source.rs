//! File input trait.

use async_trait::async_trait;

use super::model::RawFile;
use crate::error::Result;

/// Supplies raw bytes and a filename to the asset store.
///
/// Implementations should return `AparatError::Read` when the underlying
/// stream cannot be read.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Name used in notices before the bytes have been read.
    fn display_name(&self) -> String;

    async fn read(&self) -> Result<RawFile>;
}

/// An asset source over bytes already held in memory.
#[async_trait]
impl AssetSource for RawFile {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    async fn read(&self) -> Result<RawFile> {
        Ok(self.clone())
    }
}
