//! Process-wide fetch gate using a Tokio mutex and an optional governor quota.
//!
//! The gate guarantees that at most one upstream request is in flight at any
//! instant. Holding a [`FetchGateGuard`] is the only way to talk to the
//! upstream; dropping it (including on cancellation) releases the gate.

use derive_getters::Getters;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

// Type alias for the direct (un-keyed) limiter
type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Configuration for the fetch gate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct GateConfig {
    /// Requests allowed per minute on top of serialization (0 = unlimited)
    #[serde(default)]
    #[builder(default)]
    requests_per_minute: u32,
}

/// Single-flight gate for upstream requests.
///
/// Cloning a gate shares it: every clone guards the same region.
///
/// # Example
///
/// ```rust,ignore
/// use gamerscore_rate_limit::{FetchGate, GateConfig};
///
/// let gate = FetchGate::new(&GateConfig::default());
///
/// let guard = gate.acquire().await;
/// let response = client.get(url).send().await;
/// drop(guard); // Next caller may now fetch
/// ```
#[derive(Clone)]
pub struct FetchGate {
    lock: Arc<Mutex<()>>,
    quota: Option<Arc<DirectRateLimiter>>,
}

impl FetchGate {
    /// Create a gate from configuration.
    pub fn new(config: &GateConfig) -> Self {
        let quota = NonZeroU32::new(config.requests_per_minute).map(|n| {
            let quota = Quota::per_minute(n);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        tracing::debug!(
            requests_per_minute = config.requests_per_minute,
            "Creating fetch gate"
        );

        Self {
            lock: Arc::new(Mutex::new(())),
            quota,
        }
    }

    /// Wait until this caller may issue the next upstream request.
    ///
    /// Waits for the quota (if any) first, then for exclusive access, so a
    /// caller never holds the gate while waiting on the quota.
    pub async fn acquire(&self) -> FetchGateGuard {
        if let Some(limiter) = &self.quota {
            limiter.until_ready().await;
        }

        let guard = Arc::clone(&self.lock).lock_owned().await;
        tracing::trace!("Fetch gate acquired");
        FetchGateGuard { _guard: guard }
    }

    /// Acquire without waiting.
    ///
    /// Returns `None` if another request is in flight or the quota is spent.
    pub fn try_acquire(&self) -> Option<FetchGateGuard> {
        let guard = Arc::clone(&self.lock).try_lock_owned().ok()?;

        if let Some(limiter) = &self.quota {
            limiter.check().ok()?;
        }

        Some(FetchGateGuard { _guard: guard })
    }

    /// Whether a request is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

impl std::fmt::Debug for FetchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchGate")
            .field("busy", &self.is_busy())
            .field("has_quota", &self.quota.is_some())
            .finish()
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}

/// RAII guard for the fetch gate.
///
/// Releases the gate when dropped, including when the owning future is
/// cancelled mid-request.
#[derive(Debug)]
pub struct FetchGateGuard {
    _guard: OwnedMutexGuard<()>,
}
