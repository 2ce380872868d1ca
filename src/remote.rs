//! Remote tag-group client contract.
//!
//! The registrar talks to the remote service through [`RemoteClient`],
//! a single-operation trait the host application implements over its own
//! transport. Implementations must be idempotent under at-least-once
//! delivery: re-applying an already-accepted batch must not duplicate
//! tag effects server-side. Batches are set-dominant (see
//! [`MutationLog::collapse`](crate::MutationLog::collapse)), which keeps
//! the common case naturally idempotent.

use async_trait::async_trait;
use thiserror::Error;

use crate::mutation::TagGroupBatch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport-level failure; the exchange may be retried.
    #[error("remote service unavailable: {0}")]
    Unavailable(String),
    /// The bounded exchange timeout elapsed.
    #[error("remote exchange timed out")]
    Timeout,
    /// The service refused the batch. Not retried.
    #[error("remote service rejected batch: status {status}")]
    Rejected { status: u16 },
}

impl RemoteError {
    /// Whether retrying the same exchange could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Acknowledgement of an accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAck {
    pub status: u16,
}

impl RemoteAck {
    #[must_use]
    pub fn accepted() -> Self {
        Self { status: 200 }
    }
}

/// Abstract sender for composed mutation batches.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Apply a collapsed batch to the channel identified by `channel_id`.
    async fn apply(
        &self,
        channel_id: &str,
        batch: &TagGroupBatch,
    ) -> Result<RemoteAck, RemoteError>;
}
