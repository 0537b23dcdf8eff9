//! Tests for service startup, restore and shutdown persistence.

mod common;

use common::ScriptedFetcher;
use gamerscore_lookup::{GamerscoreConfig, LookupService, StorageConfig};
use gamerscore_storage::{JsonFileStore, PersistentStore};
use std::sync::Arc;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> GamerscoreConfig {
    GamerscoreConfig::default().with_storage(
        StorageConfig::default()
            .with_cache_file(dir.path().join("cache.json"))
            .with_ignore_file(dir.path().join("checked.txt")),
    )
}

#[tokio::test(start_paused = true)]
async fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let store = Arc::new(JsonFileStore::new(config.storage().cache_file()));

    let fetcher = Arc::new(ScriptedFetcher::always_ok("2,500", 1));
    let service = LookupService::with_parts(config.clone(), fetcher, store.clone()).await;
    assert_eq!(service.resolver().resolve("Returning").await, Ok(2500));
    service.state().tracker().record_failure("wobbly");
    service.persist().await.unwrap();

    let idle = Arc::new(ScriptedFetcher::new([]));
    let restarted = LookupService::with_parts(config, idle.clone(), store).await;
    assert_eq!(restarted.resolver().resolve("returning").await, Ok(2500));
    assert_eq!(restarted.state().tracker().failure_count("wobbly"), 1);
    assert_eq!(idle.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_state_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    std::fs::write(config.storage().cache_file(), "{ not json").unwrap();
    let store = Arc::new(JsonFileStore::new(config.storage().cache_file()));

    let service =
        LookupService::with_parts(config, Arc::new(ScriptedFetcher::new([])), store).await;

    assert!(service.state().cache().is_empty());
    assert!(service.state().tracker().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unwritable_ignore_list_degrades_to_memory() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let config = GamerscoreConfig::default().with_storage(
        StorageConfig::default()
            .with_cache_file(dir.path().join("cache.json"))
            .with_ignore_file(blocker.join("checked.txt")),
    );
    let store = Arc::new(JsonFileStore::new(config.storage().cache_file()));

    let service =
        LookupService::with_parts(config, Arc::new(ScriptedFetcher::new([])), store).await;

    assert!(service.registry().path().is_none());
    assert!(service.registry().add("works anyway").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_collector_and_sweeper_share_state() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let store = Arc::new(JsonFileStore::new(config.storage().cache_file()));
    let fetcher = Arc::new(ScriptedFetcher::always_ok("50", 1));
    let service = LookupService::with_parts(config, fetcher, store.clone()).await;

    let report = service
        .collector()
        .process(gamerscore_core::Gamertag::new("Shared"))
        .await;
    assert!(report.low_score);

    service.sweeper().run_cycle().await;
    let saved = store.load().await.unwrap();
    assert_eq!(saved.entries.len(), 1);
    assert!(service.registry().contains("shared"));
}
