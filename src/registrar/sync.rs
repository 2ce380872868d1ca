//! Channel synchronization: snapshot, exchange, drain.
//!
//! One exchange may be in flight per channel identifier. Triggers that
//! arrive while an exchange is running queue on the channel gate and
//! coalesce: the first waiter runs a fresh exchange over everything
//! pending, later waiters whose work it absorbed return without touching
//! the network.

use std::sync::atomic::Ordering;
use std::time::Instant;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::mutation::TagGroupBatch;
use crate::remote::RemoteError;
use crate::resilience::retry_if;

use super::types::{RegistrarEvent, SyncOutcome};
use super::TagGroupsRegistrar;

/// Captured under the log lock when an exchange begins; the success path
/// drains exactly this sequence range and nothing more.
struct SyncSnapshot {
    epoch: u64,
    last_seq: u64,
    mutations: usize,
    batch: TagGroupBatch,
}

impl TagGroupsRegistrar {
    /// Trigger synchronization for the given channel identifier.
    ///
    /// Fire-and-forget: the exchange runs on the Tokio runtime and this
    /// call returns immediately. Completion-path failures surface via
    /// [`subscribe`](Self::subscribe) and logs. Must be called from
    /// within a Tokio runtime; use [`sync_now`](Self::sync_now) to await
    /// the outcome instead.
    pub fn update_tag_groups(&self, channel_id: &str) {
        let this = self.clone();
        let channel_id = channel_id.to_string();
        tokio::spawn(async move {
            // sync_now logs and broadcasts failures; nothing left to do
            let _ = this.sync_now(&channel_id).await;
        });
    }

    /// Synchronize pending mutations for a channel and await the outcome.
    ///
    /// An empty pending log returns [`SyncOutcome::NothingPending`]
    /// without a remote call. Concurrent calls for the same channel
    /// serialize; calls absorbed by another exchange return
    /// [`SyncOutcome::Coalesced`]. On failure pending mutations are
    /// untouched and the caller may re-trigger later.
    pub async fn sync_now(&self, channel_id: &str) -> Result<SyncOutcome, RemoteError> {
        let state = self.inner.channel(channel_id);

        state.queued.store(true, Ordering::Release);
        let _gate = state.gate.lock().await;

        // An exchange that started after our request covered it already
        if !state.queued.swap(false, Ordering::AcqRel) {
            debug!(channel_id, "Sync request coalesced into a finished exchange");
            crate::metrics::record_sync("coalesced");
            return Ok(SyncOutcome::Coalesced);
        }

        state.syncing.store(true, Ordering::Release);
        let result = self.sync_exchange(channel_id).await;
        state.syncing.store(false, Ordering::Release);

        match &result {
            Ok(SyncOutcome::Synced { groups, mutations }) => {
                info!(channel_id, groups, mutations, "Tag groups synchronized");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(channel_id, error = %e, "Tag group sync failed, mutations retained");
                let _ = self.inner.events.send(RegistrarEvent::SyncFailed {
                    channel_id: channel_id.to_string(),
                    error: e.clone(),
                });
            }
        }
        result
    }

    async fn sync_exchange(&self, channel_id: &str) -> Result<SyncOutcome, RemoteError> {
        let snapshot = {
            let log = self.inner.log.lock().await;
            let batch = log.collapse();
            match log.last_seq() {
                Some(last_seq) if !batch.is_empty() => Some(SyncSnapshot {
                    epoch: log.epoch(),
                    last_seq,
                    mutations: log.len(),
                    batch,
                }),
                _ => None,
            }
        };

        let Some(snapshot) = snapshot else {
            debug!(channel_id, "No pending tag mutations, skipping sync");
            crate::metrics::record_sync("nothing_pending");
            return Ok(SyncOutcome::NothingPending);
        };

        let start = Instant::now();
        let remote_timeout = self.inner.config.remote_timeout();
        let retry_config = self.inner.config.sync_retry();
        let batch = &snapshot.batch;

        let ack = retry_if(
            "tag_group_sync",
            &retry_config,
            || {
                let client = self.inner.client.clone();
                async move {
                    match timeout(remote_timeout, client.apply(channel_id, batch)).await {
                        Ok(result) => result,
                        Err(_) => {
                            crate::metrics::record_timeout();
                            Err(RemoteError::Timeout)
                        }
                    }
                }
            },
            RemoteError::is_transient,
        )
        .await;

        let ack = match ack {
            Ok(ack) => ack,
            Err(e) => {
                crate::metrics::record_sync(if e.is_transient() { "failed" } else { "rejected" });
                return Err(e);
            }
        };

        // Remove exactly the captured range; mutations appended during
        // the exchange have higher sequence numbers and stay pending.
        {
            let mut log = self.inner.log.lock().await;
            if log.epoch() == snapshot.epoch {
                log.drain_through(snapshot.last_seq);
                crate::metrics::set_pending_mutations(log.len());
                if let Err(e) = self.inner.store.save(&log).await {
                    warn!(error = %e, "Failed to persist drained pending log");
                    crate::metrics::record_store_operation("save", "unavailable");
                } else {
                    crate::metrics::record_store_operation("save", "success");
                }
            } else {
                // clear_all_pending_tag_updates raced the exchange; the
                // snapshot's prefix is already gone
                debug!(channel_id, "Pending log cleared mid-exchange, nothing to drain");
            }
        }

        let groups = snapshot.batch.group_count();
        debug!(channel_id, status = ack.status, groups, "Remote accepted tag batch");
        crate::metrics::record_sync("success");
        crate::metrics::record_batch_groups(groups);
        crate::metrics::record_sync_latency(start.elapsed());

        let _ = self.inner.events.send(RegistrarEvent::TagGroupsSent {
            channel_id: channel_id.to_string(),
            batch: snapshot.batch,
        });

        Ok(SyncOutcome::Synced {
            groups,
            mutations: snapshot.mutations,
        })
    }
}
