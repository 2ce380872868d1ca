//! Property-based tests for mutation collapse and persistence parsing.
//!
//! Uses proptest to generate random mutation sequences and malformed
//! persisted snapshots, verifying collapse invariants hold and parsing
//! never panics.
//!
//! Run with: `cargo test --test proptest_collapse`

use proptest::prelude::*;

use tag_registrar::{MutationKind, MutationLog, TagMutation};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Small alphabets so groups and tags collide often; collisions are where
/// the collapse rules actually fire.
fn group_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,2}"
}

fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-d]{1,2}", 1..4)
}

fn mutation_strategy() -> impl Strategy<Value = TagMutation> {
    (
        prop_oneof![
            Just(MutationKind::Add),
            Just(MutationKind::Remove),
            Just(MutationKind::Set),
        ],
        group_strategy(),
        tags_strategy(),
    )
        .prop_map(|(kind, group, tags)| TagMutation::new(kind, &group, tags).unwrap())
}

fn log_strategy() -> impl Strategy<Value = MutationLog> {
    prop::collection::vec(mutation_strategy(), 0..30).prop_map(|mutations| {
        let mut log = MutationLog::new();
        for mutation in mutations {
            log.append(mutation);
        }
        log
    })
}

// =============================================================================
// Collapse Invariant Tests
// =============================================================================

proptest! {
    /// Collapse is deterministic for a given log
    #[test]
    fn prop_collapse_deterministic(log in log_strategy()) {
        prop_assert_eq!(log.collapse(), log.collapse());
    }

    /// A group never appears in both the set section and add/remove
    #[test]
    fn prop_set_excludes_add_remove(log in log_strategy()) {
        let batch = log.collapse();
        for group in batch.set.keys() {
            prop_assert!(!batch.add.contains_key(group));
            prop_assert!(!batch.remove.contains_key(group));
        }
    }

    /// Pairwise cancellation means a tag is never both added and removed
    /// for the same group
    #[test]
    fn prop_add_remove_disjoint(log in log_strategy()) {
        let batch = log.collapse();
        for (group, added) in &batch.add {
            if let Some(removed) = batch.remove.get(group) {
                prop_assert!(added.is_disjoint(removed),
                    "group '{}' has overlapping add/remove", group);
            }
        }
    }

    /// Appending a Set makes it win outright for that group
    #[test]
    fn prop_final_set_dominates(log in log_strategy(), tags in tags_strategy()) {
        let mut log = log;
        log.append(TagMutation::set("a", tags.clone()).unwrap());

        let batch = log.collapse();
        let expected: std::collections::BTreeSet<String> = tags.into_iter().collect();
        prop_assert_eq!(batch.set.get("a"), Some(&expected));
        prop_assert!(!batch.add.contains_key("a"));
        prop_assert!(!batch.remove.contains_key("a"));
    }

    /// Clearing the log clears the collapse, whatever came before
    #[test]
    fn prop_clear_collapses_to_empty(log in log_strategy()) {
        let mut log = log;
        log.clear();
        prop_assert!(log.collapse().is_empty());
    }

    /// Collapse output never names a group absent from the log
    #[test]
    fn prop_no_invented_groups(log in log_strategy()) {
        let input_groups: std::collections::BTreeSet<&str> =
            log.entries().iter().map(|m| m.group()).collect();

        let batch = log.collapse();
        for group in batch.set.keys()
            .chain(batch.add.keys())
            .chain(batch.remove.keys())
        {
            prop_assert!(input_groups.contains(group.as_str()));
        }
    }

    /// Draining through any captured sequence leaves the later entries
    /// intact and in order
    #[test]
    fn prop_drain_through_keeps_later_entries(log in log_strategy(), k in 1usize..40) {
        let len = log.len();
        if len == 0 {
            return Ok(());
        }
        let k = k.min(len);
        // Sequence number of the k-th entry
        let seq = log.last_seq().unwrap() - (len - k) as u64;
        let suffix: Vec<_> = log.entries().iter().skip(k).cloned().collect();

        let mut log = log;
        log.drain_through(seq);

        prop_assert_eq!(log.entries(), suffix.as_slice());
    }
}

// =============================================================================
// Persistence Parsing Fuzz Tests
// =============================================================================

proptest! {
    /// Snapshot parsing never panics on arbitrary bytes; corrupt input
    /// only ever produces a clean error (the registrar degrades to empty)
    #[test]
    fn fuzz_log_from_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..5000)) {
        let result: Result<MutationLog, _> = serde_json::from_slice(&bytes);
        let _ = result;
    }

    /// Corrupted valid snapshots fail cleanly or parse to something sane
    #[test]
    fn fuzz_corrupted_snapshot(
        log in log_strategy(),
        corruption in prop::collection::vec(any::<u8>(), 1..20),
        position in 0usize..5000,
    ) {
        let mut serialized = serde_json::to_vec(&log).unwrap();
        if serialized.is_empty() {
            return Ok(());
        }

        let pos = position % serialized.len();
        for (i, b) in corruption.iter().enumerate() {
            let idx = (pos + i) % serialized.len();
            serialized[idx] ^= b;
        }

        let result: Result<MutationLog, _> = serde_json::from_slice(&serialized);
        if let Ok(parsed) = result {
            // If corruption went unnoticed, collapse must still not panic
            let _ = parsed.collapse();
        }
    }

    /// Persistence roundtrip preserves the collapse
    #[test]
    fn prop_snapshot_roundtrip_preserves_collapse(log in log_strategy()) {
        let serialized = serde_json::to_vec(&log).unwrap();
        let restored: MutationLog = serde_json::from_slice(&serialized).unwrap();

        prop_assert_eq!(restored.len(), log.len());
        prop_assert_eq!(restored.epoch(), log.epoch());
        prop_assert_eq!(restored.collapse(), log.collapse());
    }
}
