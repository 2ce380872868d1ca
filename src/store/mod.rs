//! Pending-state persistence.
//!
//! The [`PendingStore`](traits::PendingStore) trait owns the durable
//! snapshot of the mutation log. [`FilePendingStore`](file::FilePendingStore)
//! is the production implementation; [`InMemoryPendingStore`](memory::InMemoryPendingStore)
//! backs tests and store-less embedding.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FilePendingStore;
pub use memory::InMemoryPendingStore;
pub use traits::{PendingStore, StoreError};
