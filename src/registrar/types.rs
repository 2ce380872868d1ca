//! Public types for the tag groups registrar.

use crate::mutation::TagGroupBatch;
use crate::remote::RemoteError;

/// Per-channel sync phase.
///
/// Each channel identifier cycles `Idle → Syncing → Idle` whether the
/// exchange succeeds or fails; failure only changes what stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No exchange in flight for this channel
    Idle,
    /// An exchange is in flight
    Syncing,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Syncing => write!(f, "Syncing"),
        }
    }
}

/// Result of a sync trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A batch was accepted by the remote service.
    Synced {
        /// Distinct groups in the uploaded batch
        groups: usize,
        /// Log entries confirmed and removed
        mutations: usize,
    },
    /// The pending log collapsed to nothing; no exchange was made.
    NothingPending,
    /// An exchange already in flight absorbed this request.
    Coalesced,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced { groups, mutations } => {
                write!(f, "Synced(groups={}, mutations={})", groups, mutations)
            }
            Self::NothingPending => write!(f, "NothingPending"),
            Self::Coalesced => write!(f, "Coalesced"),
        }
    }
}

/// Registrar events, broadcast to subscribers.
///
/// Delivery is fire-and-forget: a lagging subscriber skips events, and
/// having no subscribers is never an error.
#[derive(Debug, Clone)]
pub enum RegistrarEvent {
    /// A batch was accepted by the remote service.
    TagGroupsSent {
        channel_id: String,
        batch: TagGroupBatch,
    },
    /// A sync trigger failed after retries; mutations remain pending.
    SyncFailed {
        channel_id: String,
        error: RemoteError,
    },
}
