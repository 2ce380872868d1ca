// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the tag registrar.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `tag_registrar_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: add, remove, set
//! - `operation`: load, save, clear
//! - `status`: success, failed, rejected, nothing_pending, coalesced

use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// Record an accepted tag mutation
pub fn record_mutation(kind: &str) {
    counter!(
        "tag_registrar_mutations_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record a mutation rejected at the validation boundary
pub fn record_invalid_mutation(kind: &str) {
    counter!(
        "tag_registrar_invalid_mutations_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Set current pending mutation count
pub fn set_pending_mutations(count: usize) {
    gauge!("tag_registrar_pending_mutations").set(count as f64);
}

/// Record a pending-store operation outcome
pub fn record_store_operation(operation: &str, status: &str) {
    counter!(
        "tag_registrar_store_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a sync trigger outcome
pub fn record_sync(status: &str) {
    counter!(
        "tag_registrar_syncs_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record end-to-end sync exchange latency
pub fn record_sync_latency(duration: Duration) {
    histogram!("tag_registrar_sync_seconds").record(duration.as_secs_f64());
}

/// Record the group spread of an uploaded batch
pub fn record_batch_groups(count: usize) {
    histogram!("tag_registrar_batch_groups").record(count as f64);
}

/// Record a remote exchange timeout
pub fn record_timeout() {
    counter!("tag_registrar_timeouts_total").increment(1);
}

/// RAII timer that records sync latency when dropped
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_sync_latency(self.start.elapsed());
    }
}
