//! Single-allowance credit gate.

use std::sync::Arc;

use super::repository::{FlagStore, LOCK_FLAG_KEY};
use crate::error::Result;

/// Tracks the remaining generation allowance and its durable lock.
///
/// Credits live in `{0, 1}`. The lock flag mirrors an exhausted allowance
/// across restarts until an explicit [`CreditGate::reset`].
pub struct CreditGate {
    credits: u8,
    store: Arc<dyn FlagStore>,
}

impl CreditGate {
    /// Creates a gate with one credit. Call [`CreditGate::init`] before use
    /// to honour a lock persisted by an earlier session.
    pub fn new(store: Arc<dyn FlagStore>) -> Self {
        Self { credits: 1, store }
    }

    /// Reads the durable lock and starts the session exhausted if it is set.
    pub async fn init(&mut self) -> Result<()> {
        let locked = self.is_persistently_locked().await?;
        self.credits = if locked { 0 } else { 1 };
        tracing::debug!(locked, credits = self.credits, "Credit gate initialized");
        Ok(())
    }

    pub fn credits(&self) -> u8 {
        self.credits
    }

    pub fn has_allowance(&self) -> bool {
        self.credits > 0
    }

    /// Spends the allowance and persists the lock.
    ///
    /// Idempotent: a second call leaves credits at 0 and rewrites the same
    /// flag value. The in-memory credit is spent even if persisting fails.
    pub async fn consume(&mut self) -> Result<()> {
        self.credits = 0;
        self.store.set(LOCK_FLAG_KEY, true).await
    }

    /// Restores the allowance and clears the durable lock.
    pub async fn reset(&mut self) -> Result<()> {
        self.credits = 1;
        self.store.set(LOCK_FLAG_KEY, false).await
    }

    pub async fn is_persistently_locked(&self) -> Result<bool> {
        self.store.get(LOCK_FLAG_KEY).await
    }
}
