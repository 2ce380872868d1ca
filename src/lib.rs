//! # Tag Registrar
//!
//! A pending-mutation aggregator and synchronizer for channel tag groups.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Mutation Layer                        │
//! │  • add_tags / remove_tags / set_tags enqueue locally        │
//! │  • Validated at the boundary, ordered by a single lock      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MutationLog + PendingStore                  │
//! │  • Append-only, order-preserving log                        │
//! │  • Atomic JSON snapshot survives restarts                   │
//! │  • collapse() → minimal per-group batch                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                 (update_tag_groups per channel)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Sync Coordinator                       │
//! │  • At most one exchange in flight per channel ID            │
//! │  • Concurrent triggers coalesce into the next exchange      │
//! │  • Bounded timeout, retry on transient failure              │
//! │  • Success drains exactly the snapshotted prefix            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 RemoteClient (host-provided)                │
//! │  • apply(channel_id, batch) over the host's transport       │
//! │  • Idempotent under at-least-once delivery                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tag_registrar::{
//!     FilePendingStore, RegistrarConfig, RemoteAck, RemoteClient, RemoteError,
//!     TagGroupBatch, TagGroupsRegistrar,
//! };
//!
//! struct MyTransport;
//!
//! #[async_trait]
//! impl RemoteClient for MyTransport {
//!     async fn apply(
//!         &self,
//!         channel_id: &str,
//!         batch: &TagGroupBatch,
//!     ) -> Result<RemoteAck, RemoteError> {
//!         // POST the serialized batch to your tag-group endpoint here
//!         Ok(RemoteAck::accepted())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let registrar = TagGroupsRegistrar::new(
//!         RegistrarConfig::default(),
//!         Arc::new(FilePendingStore::new("pending_tags.json")),
//!         Arc::new(MyTransport),
//!     )
//!     .await;
//!
//!     // Queue local changes; nothing touches the network yet
//!     registrar.add_tags(["vip", "beta"], "loyalty").await;
//!     registrar.remove_tags(["trial"], "loyalty").await;
//!
//!     // Push everything pending for this channel
//!     registrar.sync_now("channel-123").await.expect("sync failed");
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered pending log**: mutations survive restarts via an atomic
//!   JSON snapshot, collapsed to a minimal batch at sync time
//! - **Per-channel serialization**: concurrent triggers coalesce into at
//!   most one in-flight exchange per channel identifier
//! - **Isolation**: mutations enqueued during an exchange are never
//!   cleared by that exchange's success
//! - **Resilience**: bounded exchange timeout, exponential-backoff retry
//!   for transient failures, rejections surfaced without retry
//! - **Events**: `TagGroupsSent` / `SyncFailed` broadcast to subscribers
//!
//! ## Modules
//!
//! - [`registrar`]: the [`TagGroupsRegistrar`] coordinator
//! - [`mutation`]: mutations, the pending log, and batch collapse
//! - [`store`]: pending-state persistence
//! - [`remote`]: the remote client contract
//! - [`resilience`]: retry with exponential backoff
//! - [`metrics`]: `metrics`-crate instrumentation

pub mod config;
pub mod metrics;
pub mod mutation;
pub mod registrar;
pub mod remote;
pub mod resilience;
pub mod store;

pub use config::RegistrarConfig;
pub use metrics::LatencyTimer;
pub use mutation::{InvalidMutation, MutationKind, MutationLog, TagGroupBatch, TagMutation};
pub use registrar::{RegistrarEvent, SyncOutcome, SyncPhase, TagGroupsRegistrar};
pub use remote::{RemoteAck, RemoteClient, RemoteError};
pub use resilience::RetryConfig;
pub use store::{FilePendingStore, InMemoryPendingStore, PendingStore, StoreError};
