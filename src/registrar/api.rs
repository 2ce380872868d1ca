//! Local mutation API: enqueue tag changes and inspect pending state.
//!
//! These operations never fail toward the caller. Invalid input is
//! dropped at the validation boundary with a warning; store failures are
//! logged and counted while the in-memory log stays authoritative (the
//! next save rewrites the full snapshot).

use tracing::{debug, warn};

use crate::mutation::{InvalidMutation, MutationKind, TagGroupBatch, TagMutation};
use crate::store::StoreError;

use super::TagGroupsRegistrar;

impl TagGroupsRegistrar {
    /// Add tags to a tag group. To update the server, make all of your
    /// changes, then call [`update_tag_groups`](Self::update_tag_groups).
    pub async fn add_tags<I, S>(&self, tags: I, group: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enqueue(MutationKind::Add, TagMutation::add(group, tags)).await;
    }

    /// Remove tags from a tag group. To update the server, make all of
    /// your changes, then call [`update_tag_groups`](Self::update_tag_groups).
    pub async fn remove_tags<I, S>(&self, tags: I, group: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enqueue(MutationKind::Remove, TagMutation::remove(group, tags)).await;
    }

    /// Set the tags for a tag group, replacing whatever the group held.
    /// To update the server, make all of your changes, then call
    /// [`update_tag_groups`](Self::update_tag_groups).
    pub async fn set_tags<I, S>(&self, tags: I, group: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enqueue(MutationKind::Set, TagMutation::set(group, tags)).await;
    }

    /// Discard all unsynced local mutations, regardless of in-flight
    /// state. An in-flight sync already captured its own snapshot; its
    /// eventual success clears nothing further.
    pub async fn clear_all_pending_tag_updates(&self) {
        let mut log = self.inner.log.lock().await;
        log.clear();
        crate::metrics::set_pending_mutations(0);

        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear pending tag snapshot");
            crate::metrics::record_store_operation("clear", "unavailable");
        } else {
            crate::metrics::record_store_operation("clear", "success");
        }
        debug!("All pending tag updates cleared");
    }

    /// Number of pending (unsynced) mutations.
    pub async fn pending_mutations(&self) -> usize {
        self.inner.log.lock().await.len()
    }

    /// Preview of the batch the next sync would upload.
    pub async fn pending_batch(&self) -> TagGroupBatch {
        self.inner.log.lock().await.collapse()
    }

    async fn enqueue(
        &self,
        kind: MutationKind,
        mutation: Result<TagMutation, InvalidMutation>,
    ) {
        let mutation = match mutation {
            Ok(mutation) => mutation,
            Err(e) => {
                warn!(kind = kind.as_str(), error = %e, "Dropping invalid tag mutation");
                crate::metrics::record_invalid_mutation(kind.as_str());
                return;
            }
        };

        let mut log = self.inner.log.lock().await;
        debug!(
            kind = kind.as_str(),
            group = mutation.group(),
            tags = mutation.tags().len(),
            "Tag mutation enqueued"
        );
        log.append(mutation);
        crate::metrics::record_mutation(kind.as_str());
        crate::metrics::set_pending_mutations(log.len());

        // Persist while holding the lock so snapshots hit disk in order.
        match self.inner.store.save(&log).await {
            Ok(()) => crate::metrics::record_store_operation("save", "success"),
            Err(StoreError::Unavailable(e)) => {
                warn!(error = %e, "Pending tag snapshot save failed, will retry on next change");
                crate::metrics::record_store_operation("save", "unavailable");
            }
            Err(StoreError::Corrupt(e)) => {
                warn!(error = %e, "Pending tag snapshot save failed");
                crate::metrics::record_store_operation("save", "corrupt");
            }
        }
    }
}
