use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{PendingStore, StoreError};
use crate::mutation::MutationLog;

/// In-memory pending store for tests and store-less embedding.
///
/// Pending mutations do not survive a restart with this store; use
/// [`FilePendingStore`](super::FilePendingStore) when durability matters.
pub struct InMemoryPendingStore {
    log: RwLock<MutationLog>,
}

impl InMemoryPendingStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: RwLock::new(MutationLog::new()),
        }
    }

    /// Number of mutations in the stored snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }
}

impl Default for InMemoryPendingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    async fn load(&self) -> Result<MutationLog, StoreError> {
        Ok(self.log.read().clone())
    }

    async fn save(&self, log: &MutationLog) -> Result<(), StoreError> {
        *self.log.write() = log.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.log.write() = MutationLog::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::TagMutation;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemoryPendingStore::new();
        assert!(store.is_empty());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryPendingStore::new();

        let mut log = MutationLog::new();
        log.append(TagMutation::add("grp", ["a"]).unwrap());
        store.save(&log).await.unwrap();

        assert_eq!(store.len(), 1);
        let restored = store.load().await.unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryPendingStore::new();

        let mut log = MutationLog::new();
        log.append(TagMutation::add("grp", ["a"]).unwrap());
        store.save(&log).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
