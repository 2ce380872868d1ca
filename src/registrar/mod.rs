// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tag groups registrar coordinator.
//!
//! The [`TagGroupsRegistrar`] ties the components together: the pending
//! [`MutationLog`] behind a single lock, the [`PendingStore`] snapshot,
//! per-channel sync serialization, and the [`RemoteClient`] exchange.
//!
//! # Per-channel lifecycle
//!
//! ```text
//! Idle → Syncing → Idle   (success: drained prefix removed)
//! Idle → Syncing → Idle   (failure: mutations retained)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tag_registrar::{
//!     RegistrarConfig, TagGroupsRegistrar, FilePendingStore, RemoteClient,
//! };
//!
//! # async fn example(client: Arc<dyn RemoteClient>) {
//! let store = Arc::new(FilePendingStore::new("pending_tags.json"));
//! let registrar = TagGroupsRegistrar::new(RegistrarConfig::default(), store, client).await;
//!
//! registrar.add_tags(["vip"], "loyalty").await;
//! registrar.remove_tags(["trial"], "loyalty").await;
//!
//! // Fire-and-forget: the exchange runs on the Tokio runtime
//! registrar.update_tag_groups("channel-123");
//! # }
//! ```

mod api;
mod sync;
mod types;

pub use types::{RegistrarEvent, SyncOutcome, SyncPhase};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use crate::config::RegistrarConfig;
use crate::mutation::MutationLog;
use crate::remote::RemoteClient;
use crate::store::{PendingStore, StoreError};

/// Coordinates pending tag mutations and their synchronization to the
/// remote service.
///
/// # Thread Safety
///
/// The registrar is a cheap-clone handle; clones share state. Any number
/// of tasks may mutate tags concurrently while syncs are in flight.
#[derive(Clone)]
pub struct TagGroupsRegistrar {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) config: RegistrarConfig,

    /// Single lock over the pending log: appends, drains, and snapshot
    /// saves all serialize here to preserve mutation order.
    pub(super) log: Mutex<MutationLog>,

    pub(super) store: Arc<dyn PendingStore>,
    pub(super) client: Arc<dyn RemoteClient>,

    /// Per-channel sync serialization state
    pub(super) channels: DashMap<String, Arc<ChannelState>>,

    pub(super) events: broadcast::Sender<RegistrarEvent>,
}

/// Serializes exchanges for one channel identifier.
#[derive(Default)]
pub(super) struct ChannelState {
    /// Held for the duration of an exchange; waiters queue here.
    pub(super) gate: Mutex<()>,
    /// A trigger arrived and has not been absorbed by an exchange yet.
    pub(super) queued: AtomicBool,
    /// An exchange is currently in flight.
    pub(super) syncing: AtomicBool,
}

impl TagGroupsRegistrar {
    /// Create a registrar, restoring the persisted pending log.
    ///
    /// A corrupt snapshot degrades to an empty log with a warning; an
    /// unavailable store starts empty and the next save retries.
    pub async fn new(
        config: RegistrarConfig,
        store: Arc<dyn PendingStore>,
        client: Arc<dyn RemoteClient>,
    ) -> Self {
        let log = match store.load().await {
            Ok(log) => {
                crate::metrics::record_store_operation("load", "success");
                log
            }
            Err(StoreError::Corrupt(e)) => {
                warn!(error = %e, "Pending tag snapshot is corrupt, starting empty");
                crate::metrics::record_store_operation("load", "corrupt");
                MutationLog::new()
            }
            Err(StoreError::Unavailable(e)) => {
                warn!(error = %e, "Pending tag store unavailable, starting empty");
                crate::metrics::record_store_operation("load", "unavailable");
                MutationLog::new()
            }
        };
        crate::metrics::set_pending_mutations(log.len());

        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                config,
                log: Mutex::new(log),
                store,
                client,
                channels: DashMap::new(),
                events,
            }),
        }
    }

    /// Create a registrar with default config, for tests and embedding.
    pub async fn for_testing(
        store: Arc<dyn PendingStore>,
        client: Arc<dyn RemoteClient>,
    ) -> Self {
        Self::new(RegistrarConfig::default(), store, client).await
    }

    #[must_use]
    pub fn config(&self) -> &RegistrarConfig {
        &self.inner.config
    }

    /// Subscribe to registrar events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistrarEvent> {
        self.inner.events.subscribe()
    }

    /// Current sync phase for a channel identifier.
    #[must_use]
    pub fn channel_phase(&self, channel_id: &str) -> SyncPhase {
        match self.inner.channels.get(channel_id) {
            Some(state) if state.syncing.load(Ordering::Acquire) => SyncPhase::Syncing,
            _ => SyncPhase::Idle,
        }
    }

    /// Whether an exchange is in flight for a channel identifier.
    #[must_use]
    pub fn is_syncing(&self, channel_id: &str) -> bool {
        self.channel_phase(channel_id) == SyncPhase::Syncing
    }
}

impl Inner {
    /// Get or create the sync state for a channel identifier.
    pub(super) fn channel(&self, channel_id: &str) -> Arc<ChannelState> {
        self.channels
            .entry(channel_id.to_string())
            .or_default()
            .clone()
    }
}
