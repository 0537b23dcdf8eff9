//! Tests for layered configuration loading.

use gamerscore_lookup::GamerscoreConfig;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_bundled_defaults() {
    let config = GamerscoreConfig::load().unwrap();

    assert_eq!(*config.cache().ttl_secs(), 3600);
    assert_eq!(*config.sweeper().interval_secs(), 600);
    assert!(*config.sweeper().persist_on_sweep());
    assert_eq!(*config.retry().max_attempts(), 3);
    assert_eq!(*config.retry().throttle_ms(), 1000);
    assert_eq!(*config.retry().max_backoff_secs(), 8);
    assert_eq!(*config.retry().rate_limit_pause_secs(), 5);
    assert_eq!(*config.gate().requests_per_minute(), 0);
    assert_eq!(config.upstream().base_url(), "https://xboxgamertag.com");
    assert_eq!(
        config.storage().ignore_file(),
        &PathBuf::from("checked_gamertags.txt")
    );
    assert_eq!(*config.collector().low_score_threshold(), 2000);
}

#[test]
fn test_bundled_file_matches_builtin_defaults() {
    let loaded = GamerscoreConfig::load().unwrap();
    assert_eq!(loaded, GamerscoreConfig::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(
        file,
        r#"
[cache]
ttl_secs = 60

[retry]
max_attempts = 5

[storage]
cache_file = "/var/lib/gamerscore/cache.json"
"#
    )
    .unwrap();

    let config = GamerscoreConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.cache().ttl_secs(), 60);
    assert_eq!(*config.retry().max_attempts(), 5);
    assert_eq!(*config.retry().throttle_ms(), 1000);
    assert_eq!(
        config.storage().cache_file(),
        &PathBuf::from("/var/lib/gamerscore/cache.json")
    );
    assert_eq!(
        config.storage().ignore_file(),
        &PathBuf::from("checked_gamertags.txt")
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let err = GamerscoreConfig::from_file("/nonexistent/gamerscore.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read configuration"));
}

#[test]
fn test_malformed_value_is_an_error() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[cache]\nttl_secs = \"forever\"").unwrap();

    let err = GamerscoreConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse configuration"));
}
