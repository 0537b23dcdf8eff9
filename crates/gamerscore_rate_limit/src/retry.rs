//! Retry loop configuration.

use crate::BackoffPolicy;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budget and fixed pauses for one lookup.
///
/// # Example
///
/// ```toml
/// [retry]
/// max_attempts = 3
/// throttle_ms = 1000
/// max_backoff_secs = 8
/// rate_limit_pause_secs = 5
/// attempt_timeout_secs = 15
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct RetryConfig {
    /// Attempts per lookup before giving up
    #[serde(default = "default_max_attempts")]
    #[builder(default = "default_max_attempts()")]
    max_attempts: u32,

    /// Wait before the first attempt (milliseconds)
    #[serde(default = "default_throttle_ms")]
    #[builder(default = "default_throttle_ms()")]
    throttle_ms: u64,

    /// Cap on the exponential backoff (seconds)
    #[serde(default = "default_max_backoff_secs")]
    #[builder(default = "default_max_backoff_secs()")]
    max_backoff_secs: u64,

    /// Extra pause after a 429 response (seconds)
    #[serde(default = "default_rate_limit_pause_secs")]
    #[builder(default = "default_rate_limit_pause_secs()")]
    rate_limit_pause_secs: u64,

    /// Deadline for a single upstream attempt (seconds)
    #[serde(default = "default_attempt_timeout_secs")]
    #[builder(default = "default_attempt_timeout_secs()")]
    attempt_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_max_backoff_secs() -> u64 {
    8
}

fn default_rate_limit_pause_secs() -> u64 {
    5
}

fn default_attempt_timeout_secs() -> u64 {
    15
}

impl RetryConfig {
    /// Wait before the first attempt.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Extra pause after a rate-limited response.
    pub fn rate_limit_pause(&self) -> Duration {
        Duration::from_secs(self.rate_limit_pause_secs)
    }

    /// Deadline for a single upstream attempt.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Backoff policy capped at `max_backoff_secs`.
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_secs(self.max_backoff_secs))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            throttle_ms: default_throttle_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            rate_limit_pause_secs: default_rate_limit_pause_secs(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}
