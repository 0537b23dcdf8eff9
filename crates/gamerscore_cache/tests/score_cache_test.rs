//! Tests for TTL score cache behavior.

use chrono::{DateTime, TimeDelta, Utc};
use gamerscore_cache::{CacheEntry, ScoreCache, ScoreCacheConfig, ScoreCacheConfigBuilder};
use gamerscore_core::NormalizedKey;

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn cache_with_ttl(ttl_secs: u64) -> ScoreCache {
    ScoreCache::new(ScoreCacheConfig::default().with_ttl_secs(ttl_secs))
}

#[test]
fn test_default_ttl_is_one_hour() {
    let config = ScoreCacheConfig::default();
    assert_eq!(*config.ttl_secs(), 3600);
    assert_eq!(config.ttl(), TimeDelta::hours(1));
}

#[test]
fn test_builder_defaults_match() {
    let config = ScoreCacheConfigBuilder::default().build().unwrap();
    assert_eq!(*config.ttl_secs(), 3600);
}

#[test]
fn test_get_returns_fresh_value() {
    let cache = cache_with_ttl(60);
    cache.put_at("Player1", 1234, t0());

    let just_before = t0() + TimeDelta::seconds(59);
    assert_eq!(cache.get_at("player1", just_before), Some(1234));
}

#[test]
fn test_entry_exactly_at_ttl_is_expired_and_removed() {
    let cache = cache_with_ttl(60);
    cache.put_at("Player1", 1234, t0());

    let at_ttl = t0() + TimeDelta::seconds(60);
    assert_eq!(cache.get_at("player1", at_ttl), None);
    assert!(cache.is_empty(), "expired entry should be removed on read");
}

#[test]
fn test_normalized_keys_share_an_entry() {
    let cache = ScoreCache::default();
    cache.put_at("  FooBar ", 10, t0());
    cache.put_at("foobar", 20, t0());

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_at("FOOBAR", t0()), Some(20));
    assert!(cache.contains_key(" FoObAr"));
}

#[test]
fn test_put_overwrites_and_refreshes_timestamp() {
    let cache = cache_with_ttl(60);
    cache.put_at("tag", 1, t0());
    let later = t0() + TimeDelta::seconds(50);
    cache.put_at("tag", 2, later);

    let entry = cache.entries().pop().unwrap();
    assert_eq!(*entry.value(), 2);
    assert_eq!(*entry.observed_at(), later);
    assert_eq!(cache.get_at("tag", t0() + TimeDelta::seconds(100)), Some(2));
}

#[test]
fn test_observed_at_never_moves_backwards() {
    let cache = ScoreCache::default();
    cache.put_at("tag", 1, t0());
    cache.put_at("tag", 2, t0() - TimeDelta::seconds(30));

    let entry = cache.entries().pop().unwrap();
    assert_eq!(*entry.value(), 2);
    assert_eq!(*entry.observed_at(), t0());
}

#[test]
fn test_evict_expired_counts_removed_entries() {
    let cache = cache_with_ttl(60);
    cache.put_at("old1", 1, t0());
    cache.put_at("old2", 2, t0() + TimeDelta::seconds(10));
    cache.put_at("new", 3, t0() + TimeDelta::seconds(50));

    let removed = cache.evict_expired(t0() + TimeDelta::seconds(70));

    assert_eq!(removed, 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains_key("new"));
}

#[test]
fn test_evict_is_idempotent() {
    let cache = cache_with_ttl(60);
    cache.put_at("old", 1, t0());
    let now = t0() + TimeDelta::seconds(60);

    assert_eq!(cache.evict_expired(now), 1);
    assert_eq!(cache.evict_expired(now), 0);
}

#[test]
fn test_restore_and_snapshot() {
    let cache = ScoreCache::default();
    cache.restore(vec![
        CacheEntry::new(NormalizedKey::new("b"), 2, t0()),
        CacheEntry::new(NormalizedKey::new("a"), 1, t0()),
    ]);

    let keys: Vec<String> = cache
        .entries()
        .iter()
        .map(|e| e.key().as_str().to_string())
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_entry_timestamp_truncated_to_millis() {
    let precise = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    let entry = CacheEntry::new(NormalizedKey::new("x"), 1, precise);
    assert_eq!(entry.observed_at().timestamp_subsec_nanos(), 123_000_000);
}

#[test]
fn test_clear_empties_cache() {
    let cache = ScoreCache::default();
    cache.put("a", 1);
    cache.put("b", 2);
    cache.clear();
    assert!(cache.is_empty());
}
