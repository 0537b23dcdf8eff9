//! Score cache implementation.

use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use gamerscore_core::{NormalizedKey, Score};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cached score with the time it was observed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CacheEntry {
    key: NormalizedKey,
    value: Score,
    observed_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry. `observed_at` is truncated to millisecond precision.
    pub fn new(key: NormalizedKey, value: Score, observed_at: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            observed_at: truncate_to_millis(observed_at),
        }
    }

    /// Age of this entry at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.observed_at
    }

    /// Whether this entry has reached the TTL at `now`.
    ///
    /// An entry exactly `ttl` old is expired.
    pub fn is_expired(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        self.age(now) >= ttl
    }
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// Configuration for the score cache.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ScoreCacheConfig {
    /// TTL for cached scores (seconds)
    #[serde(default = "default_ttl_secs")]
    #[builder(default = "default_ttl_secs()")]
    ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour
}

impl ScoreCacheConfig {
    /// TTL as a time delta.
    pub fn ttl(&self) -> TimeDelta {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for ScoreCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Normalized tag → score cache with TTL expiry.
///
/// Pure TTL semantics: no size bound and no LRU eviction. Expired entries are
/// dropped lazily by [`ScoreCache::get`] and eagerly by
/// [`ScoreCache::evict_expired`]. Every operation takes the internal lock for a
/// single read-modify-write, so the cache can be shared behind an `Arc`.
///
/// # Example
///
/// ```
/// use gamerscore_cache::{ScoreCache, ScoreCacheConfig};
///
/// let cache = ScoreCache::new(ScoreCacheConfig::default());
/// cache.put("Player1", 1234);
///
/// assert_eq!(cache.get("  PLAYER1 "), Some(1234));
/// ```
#[derive(Debug)]
pub struct ScoreCache {
    config: ScoreCacheConfig,
    entries: Mutex<HashMap<NormalizedKey, CacheEntry>>,
}

impl ScoreCache {
    /// Create an empty cache.
    pub fn new(config: ScoreCacheConfig) -> Self {
        tracing::debug!(ttl_secs = config.ttl_secs, "Creating new ScoreCache");
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &ScoreCacheConfig {
        &self.config
    }

    /// Look up a score as of now.
    pub fn get(&self, key: &str) -> Option<Score> {
        self.get_at(key, Utc::now())
    }

    /// Look up a score as of `now`.
    ///
    /// Returns the value only while `now - observed_at < ttl`. An expired
    /// entry is removed as a side effect.
    #[tracing::instrument(level = "debug", skip(self, now))]
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Score> {
        let key = NormalizedKey::new(key);
        let ttl = self.config.ttl();
        let mut entries = self.entries.lock();

        let entry = entries.get(&key)?;
        if entry.is_expired(ttl, now) {
            tracing::debug!("Cache entry expired, removing");
            entries.remove(&key);
            return None;
        }

        tracing::debug!(value = entry.value, "Cache hit");
        Some(entry.value)
    }

    /// Store a score observed now.
    pub fn put(&self, key: &str, value: Score) {
        self.put_at(key, value, Utc::now());
    }

    /// Store a score observed at `now`, overwriting any existing entry.
    ///
    /// `observed_at` never moves backwards for a key: if `now` is earlier than
    /// the existing entry's timestamp the existing timestamp is kept.
    #[tracing::instrument(level = "debug", skip(self, now))]
    pub fn put_at(&self, key: &str, value: Score, now: DateTime<Utc>) {
        let key = NormalizedKey::new(key);
        let mut entries = self.entries.lock();

        let observed_at = match entries.get(&key) {
            Some(existing) if existing.observed_at > now => existing.observed_at,
            _ => now,
        };

        tracing::debug!(replaced = entries.contains_key(&key), "Inserted entry into cache");
        entries.insert(key.clone(), CacheEntry::new(key, value, observed_at));
    }

    /// Whether an entry (fresh or not yet swept) exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(&NormalizedKey::new(key))
    }

    /// Remove every entry whose age at `now` is at least the TTL.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.config.ttl();
        let mut entries = self.entries.lock();
        let before = entries.len();

        entries.retain(|_, entry| !entry.is_expired(ttl, now));

        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!(removed, remaining = entries.len(), "Purged expired cache entries");
        }
        removed
    }

    /// Snapshot of all entries, ordered by key.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self.entries.lock().values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Load previously persisted entries, replacing entries with the same key.
    pub fn restore(&self, restored: impl IntoIterator<Item = CacheEntry>) {
        let mut entries = self.entries.lock();
        for entry in restored {
            entries.insert(entry.key.clone(), entry);
        }
        tracing::debug!(count = entries.len(), "Restored cache entries");
    }

    /// Clear all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(ScoreCacheConfig::default())
    }
}
