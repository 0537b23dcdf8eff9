//! Consecutive-failure tracking and exponential backoff.

use gamerscore_core::NormalizedKey;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Exponential backoff with a hard cap.
///
/// `delay(n) = min(2^n, max_delay)` seconds, where `n` is the failure count.
///
/// ```
/// use gamerscore_rate_limit::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::new(Duration::from_secs(8));
/// assert_eq!(policy.delay(1), Duration::from_secs(2));
/// assert_eq!(policy.delay(3), Duration::from_secs(8));
/// assert_eq!(policy.delay(40), Duration::from_secs(8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Create a policy capped at `max_delay`.
    pub fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }

    /// Maximum wait regardless of failure count.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Wait before the next attempt after `failures` consecutive failures.
    pub fn delay(&self, failures: u32) -> Duration {
        let secs = 1u64.checked_shl(failures).unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(8))
    }
}

/// Per-tag consecutive failure counts.
///
/// Absent keys have a count of zero. All operations normalize the key and take
/// the internal lock once.
#[derive(Debug, Default)]
pub struct BackoffTracker {
    counts: Mutex<HashMap<NormalizedKey, u32>>,
}

impl BackoffTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current consecutive failure count.
    pub fn failure_count(&self, key: &str) -> u32 {
        self.counts
            .lock()
            .get(&NormalizedKey::new(key))
            .copied()
            .unwrap_or(0)
    }

    /// Record a failed attempt and return the new count.
    pub fn record_failure(&self, key: &str) -> u32 {
        let mut counts = self.counts.lock();
        let count = counts.entry(NormalizedKey::new(key)).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Reset a key's count to zero.
    pub fn reset(&self, key: &str) {
        self.counts.lock().remove(&NormalizedKey::new(key));
    }

    /// Keep only the keys for which `keep` returns true; returns how many were dropped.
    pub fn retain(&self, mut keep: impl FnMut(&NormalizedKey) -> bool) -> usize {
        let mut counts = self.counts.lock();
        let before = counts.len();
        counts.retain(|key, _| keep(key));
        before - counts.len()
    }

    /// Snapshot of non-zero counts, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<NormalizedKey, u32> {
        self.counts
            .lock()
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }

    /// Load persisted counts, replacing counts for the same keys.
    pub fn restore(&self, restored: impl IntoIterator<Item = (NormalizedKey, u32)>) {
        let mut counts = self.counts.lock();
        for (key, count) in restored {
            if count > 0 {
                counts.insert(key, count);
            }
        }
    }

    /// Number of keys with a recorded failure.
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    /// Whether no key has a recorded failure.
    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }
}
