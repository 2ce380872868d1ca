//! Resilience utilities: retry with exponential backoff.

pub mod retry;

pub use retry::{retry, retry_if, RetryConfig};
