use async_trait::async_trait;
use thiserror::Error;

use crate::mutation::MutationLog;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted form cannot be parsed. Callers degrade to an empty
    /// log rather than crash.
    #[error("pending state is corrupt: {0}")]
    Corrupt(String),
    /// The snapshot cannot be read or written right now. The in-memory
    /// log stays authoritative; the caller layer retries on its next save.
    #[error("pending store unavailable: {0}")]
    Unavailable(String),
}

/// Durable holder of the uncommitted mutation log.
///
/// `save` must overwrite atomically: a crash mid-save leaves either the
/// old snapshot or the new one, never a torn file.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Load the persisted log, or an empty log if none was ever saved.
    async fn load(&self) -> Result<MutationLog, StoreError>;

    /// Atomically overwrite the snapshot with `log`.
    async fn save(&self, log: &MutationLog) -> Result<(), StoreError>;

    /// Remove all pending state.
    async fn clear(&self) -> Result<(), StoreError>;
}
