//! Durable flag store trait.

use async_trait::async_trait;

use crate::error::Result;

/// Key under which the one-time generation lock is stored.
pub const LOCK_FLAG_KEY: &str = "aparat.uploaded";

/// Repository for boolean flags that survive process restarts.
///
/// Missing keys read as `false`.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<bool>;

    async fn set(&self, key: &str, value: bool) -> Result<()>;
}
