//! Tests for the JSON snapshot store.

use chrono::{DateTime, TimeDelta, Utc};
use gamerscore_cache::{CacheEntry, ScoreCache};
use gamerscore_core::NormalizedKey;
use gamerscore_storage::{JsonFileStore, PersistentStore, StoreSnapshot};
use std::collections::BTreeMap;
use tempfile::TempDir;

fn observed(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000 + millis).unwrap()
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("cache.json"));

    let snapshot = store.load().await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_save_then_load_reproduces_state() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("cache.json"));

    let mut failures = BTreeMap::new();
    failures.insert(NormalizedKey::new("flaky"), 2);
    let snapshot = StoreSnapshot {
        entries: vec![
            CacheEntry::new(NormalizedKey::new("player1"), 1234, observed(123)),
            CacheEntry::new(NormalizedKey::new("player2"), 99_999, observed(987_654)),
        ],
        failures,
    };

    store.save(&snapshot).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded, snapshot);
}

#[tokio::test]
async fn test_cache_roundtrip_through_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("cache.json"));

    let cache = ScoreCache::default();
    let now = Utc::now();
    cache.put_at("Player1", 1234, now);
    cache.put_at("Other", 5, now - TimeDelta::minutes(5));

    store
        .save(&StoreSnapshot {
            entries: cache.entries(),
            failures: BTreeMap::new(),
        })
        .await
        .unwrap();

    let reloaded = ScoreCache::default();
    reloaded.restore(store.load().await.unwrap().entries);

    assert_eq!(reloaded.entries(), cache.entries());
    assert_eq!(reloaded.get_at("player1", now), Some(1234));
}

#[tokio::test]
async fn test_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let store = JsonFileStore::new(&path);

    let mut failures = BTreeMap::new();
    failures.insert(NormalizedKey::new("flaky"), 1);
    store
        .save(&StoreSnapshot {
            entries: vec![CacheEntry::new(
                NormalizedKey::new("player1"),
                1234,
                observed(500),
            )],
            failures,
        })
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["scores"]["player1"]["score"], 1234);
    assert_eq!(json["scores"]["player1"]["timestamp"], 1_700_000_000.5);
    assert_eq!(json["failures"]["flaky"], 1);
    assert!(!path.with_extension("tmp").exists(), "temp file should be renamed");
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("state").join("cache.json");
    let store = JsonFileStore::new(&path);

    store.save(&StoreSnapshot::default()).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_corrupt_file_is_an_error_but_load_or_default_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStore::new(&path);

    assert!(store.load().await.is_err());
    assert!(store.load_or_default().await.is_empty());
}

#[tokio::test]
async fn test_hand_written_file_is_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    std::fs::write(
        &path,
        r#"{"scores": {" Player1 ": {"score": 10, "timestamp": 1700000000.0}}, "failures": {"X": 0}}"#,
    )
    .unwrap();

    let snapshot = JsonFileStore::new(&path).load().await.unwrap();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].key().as_str(), "player1");
    assert!(snapshot.failures.is_empty(), "zero counts are not restored");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_saves_publish_a_whole_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let store = JsonFileStore::new(&path);

    let snapshots: Vec<StoreSnapshot> = (0..16)
        .map(|i| StoreSnapshot {
            entries: (0..64)
                .map(|j| {
                    CacheEntry::new(
                        NormalizedKey::new(&format!("writer{}_player{}", i, j)),
                        i * 1000 + j,
                        observed(j as i64),
                    )
                })
                .collect(),
            failures: BTreeMap::new(),
        })
        .collect();

    let mut tasks = tokio::task::JoinSet::new();
    for snapshot in snapshots.clone() {
        let store = store.clone();
        tasks.spawn(async move { store.save(&snapshot).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let loaded = store.load().await.unwrap();
    assert!(snapshots.contains(&loaded), "published snapshot must be one writer's");
    assert!(!path.with_extension("tmp").exists());
}
