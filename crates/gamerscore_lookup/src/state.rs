//! The mutable state a lookup process owns.

use gamerscore_cache::{ScoreCache, ScoreCacheConfig};
use gamerscore_rate_limit::BackoffTracker;
use gamerscore_storage::StoreSnapshot;
use std::sync::Arc;
use tracing::info;

/// Shared handles to the score cache and failure counters.
///
/// Cloning is cheap; every clone points at the same cache and tracker.
#[derive(Debug, Clone, Default)]
pub struct LookupState {
    cache: Arc<ScoreCache>,
    tracker: Arc<BackoffTracker>,
}

impl LookupState {
    /// Empty state using the given cache settings.
    pub fn new(cache_config: ScoreCacheConfig) -> Self {
        Self {
            cache: Arc::new(ScoreCache::new(cache_config)),
            tracker: Arc::new(BackoffTracker::new()),
        }
    }

    /// The score cache.
    pub fn cache(&self) -> &Arc<ScoreCache> {
        &self.cache
    }

    /// The per-key failure counters.
    pub fn tracker(&self) -> &Arc<BackoffTracker> {
        &self.tracker
    }

    /// Copy the current state for persistence.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            entries: self.cache.entries(),
            failures: self.tracker.snapshot(),
        }
    }

    /// Load a saved snapshot into the live cache and tracker.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        let entries = snapshot.entries.len();
        let failures = snapshot.failures.len();
        self.cache.restore(snapshot.entries);
        self.tracker.restore(snapshot.failures);
        info!(entries, failures, "Restored persisted lookup state");
    }
}
