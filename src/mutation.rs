//! Tag mutations and the pending mutation log.
//!
//! A [`TagMutation`] is the core data unit that flows through the registrar:
//! one add/remove/set operation against a named tag group. Mutations are
//! validated at construction and immutable afterwards. The [`MutationLog`]
//! is an append-only, order-preserving record of mutations that can be
//! collapsed into a minimal [`TagGroupBatch`] for the wire.
//!
//! # Example
//!
//! ```
//! use tag_registrar::{TagMutation, MutationLog};
//!
//! let mut log = MutationLog::new();
//! log.append(TagMutation::add("device", ["a", "b"]).unwrap());
//! log.append(TagMutation::remove("device", ["a"]).unwrap());
//!
//! let batch = log.collapse();
//! assert_eq!(batch.add["device"].len(), 1);
//! assert!(batch.add["device"].contains("b"));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected at the mutation-creation boundary; never enters the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMutation {
    #[error("tag group ID is empty")]
    EmptyGroup,
    #[error("tag list for group '{0}' is empty")]
    EmptyTags(String),
}

/// The three kinds of tag mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Add tags to a group.
    Add,
    /// Remove tags from a group.
    Remove,
    /// Replace the group's tags outright.
    Set,
}

impl MutationKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
        }
    }
}

/// A single validated tag mutation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMutation {
    kind: MutationKind,
    group: String,
    tags: BTreeSet<String>,
}

impl TagMutation {
    /// Create a mutation, normalizing input.
    ///
    /// Group and tag strings are trimmed; empty entries are dropped.
    /// An empty group or an empty resulting tag set is [`InvalidMutation`].
    pub fn new<I, S>(kind: MutationKind, group: &str, tags: I) -> Result<Self, InvalidMutation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = group.trim();
        if group.is_empty() {
            return Err(InvalidMutation::EmptyGroup);
        }

        let tags: BTreeSet<String> = tags
            .into_iter()
            .map(Into::into)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return Err(InvalidMutation::EmptyTags(group.to_string()));
        }

        Ok(Self {
            kind,
            group: group.to_string(),
            tags,
        })
    }

    /// Shorthand for an [`MutationKind::Add`] mutation.
    pub fn add<I, S>(group: &str, tags: I) -> Result<Self, InvalidMutation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MutationKind::Add, group, tags)
    }

    /// Shorthand for a [`MutationKind::Remove`] mutation.
    pub fn remove<I, S>(group: &str, tags: I) -> Result<Self, InvalidMutation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MutationKind::Remove, group, tags)
    }

    /// Shorthand for a [`MutationKind::Set`] mutation.
    pub fn set<I, S>(group: &str, tags: I) -> Result<Self, InvalidMutation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MutationKind::Set, group, tags)
    }

    #[must_use]
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// Append-only, order-preserving record of pending tag mutations.
///
/// Entries carry implicit sequence numbers (`first_seq` + index), so a
/// sync snapshot can later drain exactly the entries it captured even if
/// another sync drained part of the log in the meantime. The `epoch`
/// counter bumps on [`clear`](Self::clear) so a snapshot taken before a
/// wholesale clear can detect that its entries no longer exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationLog {
    entries: Vec<TagMutation>,
    /// Sequence number of `entries[0]`
    #[serde(default)]
    first_seq: u64,
    #[serde(default)]
    epoch: u64,
}

impl MutationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mutation. O(1), never fails.
    pub fn append(&mut self, mutation: TagMutation) {
        self.entries.push(mutation);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn entries(&self) -> &[TagMutation] {
        &self.entries
    }

    /// Sequence number of the most recent entry, if any.
    #[must_use]
    pub fn last_seq(&self) -> Option<u64> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.first_seq + self.entries.len() as u64 - 1)
        }
    }

    /// Discard all entries and start a new epoch.
    pub fn clear(&mut self) {
        self.first_seq += self.entries.len() as u64;
        self.entries.clear();
        self.epoch += 1;
    }

    /// Remove every entry with a sequence number up to and including
    /// `seq` (the range captured by a sync snapshot). Entries appended
    /// after the snapshot have higher sequence numbers and stay pending,
    /// and a snapshot range another drain already removed is a no-op.
    pub fn drain_through(&mut self, seq: u64) {
        if seq < self.first_seq {
            return;
        }
        let n = ((seq - self.first_seq + 1) as usize).min(self.entries.len());
        self.entries.drain(..n);
        self.first_seq += n as u64;
    }

    /// Collapse the log into its minimal net effect per group.
    ///
    /// For each group, the latest `Set` wins outright; later adds and
    /// removes fold into its tag set. Without a `Set`, adds and removes
    /// accumulate with pairwise cancellation: a later op on a tag cancels
    /// a pending opposite op for that tag entirely.
    ///
    /// Deterministic for a given log; no I/O side effects.
    #[must_use]
    pub fn collapse(&self) -> TagGroupBatch {
        #[derive(Default)]
        struct GroupState {
            set: Option<BTreeSet<String>>,
            add: BTreeSet<String>,
            remove: BTreeSet<String>,
        }

        let mut groups: BTreeMap<&str, GroupState> = BTreeMap::new();

        for mutation in &self.entries {
            let state = groups.entry(mutation.group()).or_default();
            match mutation.kind() {
                MutationKind::Set => {
                    state.set = Some(mutation.tags().clone());
                    state.add.clear();
                    state.remove.clear();
                }
                MutationKind::Add => {
                    if let Some(ref mut set) = state.set {
                        set.extend(mutation.tags().iter().cloned());
                    } else {
                        for tag in mutation.tags() {
                            if !state.remove.remove(tag) {
                                state.add.insert(tag.clone());
                            }
                        }
                    }
                }
                MutationKind::Remove => {
                    if let Some(ref mut set) = state.set {
                        for tag in mutation.tags() {
                            set.remove(tag);
                        }
                    } else {
                        for tag in mutation.tags() {
                            if !state.add.remove(tag) {
                                state.remove.insert(tag.clone());
                            }
                        }
                    }
                }
            }
        }

        let mut batch = TagGroupBatch::default();
        for (group, state) in groups {
            if let Some(set) = state.set {
                // A Set survives even when later removes emptied it:
                // "set to empty" clears the group server-side.
                batch.set.insert(group.to_string(), set);
            } else {
                if !state.add.is_empty() {
                    batch.add.insert(group.to_string(), state.add);
                }
                if !state.remove.is_empty() {
                    batch.remove.insert(group.to_string(), state.remove);
                }
            }
        }
        batch
    }
}

/// Collapsed, wire-shaped mutation batch: per-group tag sets keyed by the
/// operation to apply. Serializes to the remote service's payload shape.
///
/// `BTreeMap`/`BTreeSet` keep the output deterministic for a given log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroupBatch {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remove: BTreeMap<String, BTreeSet<String>>,
}

impl TagGroupBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.remove.is_empty()
    }

    /// Number of distinct groups touched by this batch.
    #[must_use]
    pub fn group_count(&self) -> usize {
        let mut groups: BTreeSet<&str> = BTreeSet::new();
        groups.extend(self.set.keys().map(String::as_str));
        groups.extend(self.add.keys().map(String::as_str));
        groups.extend(self.remove.keys().map(String::as_str));
        groups.len()
    }
}
