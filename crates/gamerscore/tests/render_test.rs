//! Tests for command output rendering.

use chrono::{TimeDelta, Utc};
use gamerscore::{OutputFormat, render_cache, render_report};
use gamerscore_cache::CacheEntry;
use gamerscore_core::{Failure, Gamertag, NormalizedKey};
use gamerscore_error::FetchErrorKind;
use gamerscore_lookup::LookupReport;
use gamerscore_storage::StoreSnapshot;

fn snapshot() -> (StoreSnapshot, chrono::DateTime<Utc>) {
    let now = Utc::now();
    let snapshot = StoreSnapshot {
        entries: vec![
            CacheEntry::new(NormalizedKey::new("fresh"), 1234, now - TimeDelta::seconds(90)),
            CacheEntry::new(NormalizedKey::new("stale"), 5, now - TimeDelta::hours(2)),
        ],
        failures: [(NormalizedKey::new("flaky"), 2)].into_iter().collect(),
    };
    (snapshot, now)
}

#[test]
fn test_report_lines() {
    let ok = LookupReport {
        tag: Gamertag::new("Major Nelson"),
        resolution: Ok(98_765),
        low_score: false,
    };
    assert_eq!(render_report(&ok), "Major Nelson: 98765");

    let failed = LookupReport {
        tag: Gamertag::new("Ghost"),
        resolution: Err(Failure::exhausted(3, Some(FetchErrorKind::Timeout))),
        low_score: false,
    };
    assert_eq!(
        render_report(&failed),
        "Ghost: exhausted after 3 attempts (Request timed out)"
    );

    let ignored = LookupReport {
        tag: Gamertag::new("Seen"),
        resolution: Err(Failure::ignored()),
        low_score: false,
    };
    assert_eq!(render_report(&ignored), "Seen: ignored");
}

#[test]
fn test_human_cache_listing() {
    let (snapshot, now) = snapshot();
    let out = render_cache(&snapshot, TimeDelta::hours(1), now, OutputFormat::Human).unwrap();

    let fresh = out.lines().find(|l| l.starts_with("fresh")).unwrap();
    assert!(fresh.contains("1234"));
    assert!(fresh.contains("1m"));
    assert!(!fresh.contains("expired"));

    let stale = out.lines().find(|l| l.starts_with("stale")).unwrap();
    assert!(stale.ends_with("(expired)"));

    assert!(out.contains("Total: 2 cached scores"));
    assert!(out.lines().any(|l| l.starts_with("flaky") && l.trim_end().ends_with('2')));
}

#[test]
fn test_json_cache_listing() {
    let (snapshot, now) = snapshot();
    let out = render_cache(&snapshot, TimeDelta::hours(1), now, OutputFormat::Json).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(doc["scores"][0]["tag"], "fresh");
    assert_eq!(doc["scores"][0]["score"], 1234);
    assert_eq!(doc["scores"][0]["expired"], false);
    assert_eq!(doc["scores"][1]["expired"], true);
    assert_eq!(doc["failures"]["flaky"], 2);
}

#[test]
fn test_empty_cache_listing() {
    let out = render_cache(
        &StoreSnapshot::default(),
        TimeDelta::hours(1),
        Utc::now(),
        OutputFormat::Human,
    )
    .unwrap();
    assert!(out.contains("Total: 0 cached scores"));
    assert!(!out.contains("FAILURES"));
}
