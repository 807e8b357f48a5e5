//! Process-local flag store for ephemeral sessions and tests.

use aparat_core::credit::FlagStore;
use aparat_core::error::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Flags that last as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryFlagStore {
    flags: RwLock<HashMap<String, bool>>,
}

impl InMemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn get(&self, key: &str) -> Result<bool> {
        Ok(self.flags.read().await.get(key).copied().unwrap_or(false))
    }

    async fn set(&self, key: &str, value: bool) -> Result<()> {
        self.flags.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aparat_core::credit::LOCK_FLAG_KEY;

    #[tokio::test]
    async fn test_get_set() {
        let store = InMemoryFlagStore::new();
        assert!(!store.get(LOCK_FLAG_KEY).await.unwrap());
        store.set(LOCK_FLAG_KEY, true).await.unwrap();
        assert!(store.get(LOCK_FLAG_KEY).await.unwrap());
    }
}
