// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic tag-registrar usage example.
//!
//! Demonstrates:
//! 1. Building a registrar over a file-backed pending store
//! 2. Queuing add/remove/set mutations
//! 3. Previewing the collapsed batch
//! 4. Synchronizing to a (stubbed) remote client
//! 5. Displaying metrics (OTEL-compatible)
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::{DebuggingRecorder, Snapshotter};
use tag_registrar::{
    FilePendingStore, RegistrarConfig, RemoteAck, RemoteClient, RemoteError, TagGroupBatch,
    TagGroupsRegistrar,
};

/// Stand-in transport: prints the batch it would POST, then accepts.
struct PrintingClient;

#[async_trait]
impl RemoteClient for PrintingClient {
    async fn apply(
        &self,
        channel_id: &str,
        batch: &TagGroupBatch,
    ) -> Result<RemoteAck, RemoteError> {
        let payload = serde_json::to_string_pretty(batch).expect("batch serializes");
        println!("→ POST /api/channels/{}/tags\n{}", channel_id, payload);
        Ok(RemoteAck::accepted())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install metrics recorder (captures all metrics for OTEL export)
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    // Simple logging (no filter for simplicity)
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           tag-registrar: Basic Usage Example                  ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Build the registrar
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Building registrar...");

    let store = Arc::new(FilePendingStore::new("demo_pending_tags.json"));
    let registrar = TagGroupsRegistrar::new(
        RegistrarConfig::default(),
        store,
        Arc::new(PrintingClient),
    )
    .await;

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Queue local mutations (nothing touches the network yet)
    // ─────────────────────────────────────────────────────────────────────────
    println!("✏️  Queuing mutations...");

    registrar.add_tags(["sports", "news"], "interests").await;
    registrar.remove_tags(["news"], "interests").await;
    registrar.set_tags(["gold"], "loyalty").await;

    println!("   pending mutations: {}", registrar.pending_mutations().await);

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Preview what the next sync uploads
    // ─────────────────────────────────────────────────────────────────────────
    let preview = registrar.pending_batch().await;
    println!("🔍 Collapsed preview: {} group(s)", preview.group_count());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Synchronize
    // ─────────────────────────────────────────────────────────────────────────
    println!("🔄 Synchronizing channel 'demo-channel'...");

    let mut events = registrar.subscribe();
    let outcome = registrar.sync_now("demo-channel").await?;
    println!("   outcome: {}", outcome);
    println!("   event:   {:?}", events.recv().await?);
    println!("   pending after sync: {}", registrar.pending_mutations().await);

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Metrics snapshot
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📊 Metrics:");
    print_metrics(&snapshotter);

    // Tidy up the demo snapshot file
    let _ = tokio::fs::remove_file("demo_pending_tags.json").await;

    Ok(())
}

fn print_metrics(snapshotter: &Snapshotter) {
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        println!("   {} = {:?}", key.key().name(), value);
    }
}
