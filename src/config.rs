//! Configuration for the tag groups registrar.
//!
//! # Example
//!
//! ```
//! use tag_registrar::RegistrarConfig;
//!
//! // Minimal config (uses defaults)
//! let config = RegistrarConfig::default();
//! assert_eq!(config.remote_timeout_ms, 30_000);
//!
//! // Full config
//! let config = RegistrarConfig {
//!     remote_timeout_ms: 10_000,
//!     sync_max_retries: 1,
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::resilience::RetryConfig;

/// Configuration for the tag groups registrar.
///
/// All fields have sensible defaults; the struct deserializes from the
/// host application's config file with per-field fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarConfig {
    /// Bound on a single remote exchange in milliseconds. Elapse surfaces
    /// as a timeout failure and pending mutations are retained.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// Attempts per sync trigger for transient remote failures
    /// (1 = no retry).
    #[serde(default = "default_sync_max_retries")]
    pub sync_max_retries: usize,

    /// Initial retry backoff in milliseconds.
    #[serde(default = "default_sync_retry_initial_ms")]
    pub sync_retry_initial_ms: u64,

    /// Retry backoff cap in milliseconds.
    #[serde(default = "default_sync_retry_max_ms")]
    pub sync_retry_max_ms: u64,

    /// Capacity of the registrar event channel. Slow subscribers lag and
    /// skip events rather than block the sync path.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_remote_timeout_ms() -> u64 { 30_000 }
fn default_sync_max_retries() -> usize { 3 }
fn default_sync_retry_initial_ms() -> u64 { 500 }
fn default_sync_retry_max_ms() -> u64 { 10_000 }
fn default_event_capacity() -> usize { 16 }

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: default_remote_timeout_ms(),
            sync_max_retries: default_sync_max_retries(),
            sync_retry_initial_ms: default_sync_retry_initial_ms(),
            sync_retry_max_ms: default_sync_retry_max_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl RegistrarConfig {
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Retry shape for the sync exchange.
    #[must_use]
    pub fn sync_retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: Some(self.sync_max_retries.max(1)),
            initial_delay: Duration::from_millis(self.sync_retry_initial_ms),
            max_delay: Duration::from_millis(self.sync_retry_max_ms),
            factor: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistrarConfig::default();
        assert_eq!(config.remote_timeout(), Duration::from_secs(30));
        assert_eq!(config.sync_retry().max_retries, Some(3));
        assert_eq!(config.event_capacity, 16);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: RegistrarConfig =
            serde_json::from_str(r#"{"remote_timeout_ms": 5000}"#).unwrap();
        assert_eq!(config.remote_timeout_ms, 5000);
        assert_eq!(config.sync_max_retries, 3);
    }

    #[test]
    fn test_zero_retries_clamps_to_one_attempt() {
        let config = RegistrarConfig {
            sync_max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.sync_retry().max_retries, Some(1));
    }
}
