//! Upstream request discipline.
//!
//! - [`FetchGate`] serializes every outbound request for the whole process,
//!   optionally under a requests-per-minute quota
//! - [`BackoffTracker`] counts consecutive failures per tag
//! - [`BackoffPolicy`] turns a failure count into a wait, capped at a maximum
//! - [`RetryConfig`] bundles the retry loop's attempt budget and fixed pauses

mod backoff;
mod gate;
mod retry;

pub use backoff::{BackoffPolicy, BackoffTracker};
pub use gate::{FetchGate, FetchGateGuard, GateConfig, GateConfigBuilder};
pub use retry::{RetryConfig, RetryConfigBuilder};
