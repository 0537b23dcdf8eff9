//! Persisted cache command handlers.

use super::commands::{CacheCommands, OutputFormat};
use chrono::{DateTime, TimeDelta, Utc};
use gamerscore_error::{GamerscoreResult, StorageError, StorageErrorKind};
use gamerscore_lookup::{GamerscoreConfig, LookupState, Sweeper};
use gamerscore_storage::{JsonFileStore, PersistentStore, StoreSnapshot};
use std::fmt::Write;

/// Handle cache commands against the configured snapshot file.
pub async fn handle_cache_command(
    config: &GamerscoreConfig,
    cmd: CacheCommands,
) -> GamerscoreResult<()> {
    let store = JsonFileStore::new(config.storage().cache_file());

    match cmd {
        CacheCommands::Show { format } => {
            let snapshot = store.load().await?;
            print!(
                "{}",
                render_cache(&snapshot, config.cache().ttl(), Utc::now(), format)?
            );
        }
        CacheCommands::Sweep => {
            let state = LookupState::new(*config.cache());
            state.restore(store.load().await?);
            let report = Sweeper::new(state.clone(), *config.sweeper()).sweep_at(Utc::now());
            store.save(&state.snapshot()).await?;
            println!(
                "Evicted {} expired scores, dropped {} failure counters",
                report.evicted, report.forgotten
            );
        }
        CacheCommands::Clear => {
            store.save(&StoreSnapshot::default()).await?;
            println!("Cleared {}", store.path().display());
        }
    }

    Ok(())
}

fn describe_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Render a snapshot for display.
///
/// # Errors
///
/// Returns a serialization error if JSON output cannot be produced.
pub fn render_cache(
    snapshot: &StoreSnapshot,
    ttl: TimeDelta,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> GamerscoreResult<String> {
    match format {
        OutputFormat::Json => {
            let scores: Vec<_> = snapshot
                .entries
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "tag": entry.key().as_str(),
                        "score": entry.value(),
                        "observed_at": entry.observed_at().to_rfc3339(),
                        "expired": entry.is_expired(ttl, now),
                    })
                })
                .collect();
            let document = serde_json::json!({
                "scores": scores,
                "failures": snapshot.failures,
            });
            let mut out = serde_json::to_string_pretty(&document).map_err(|e| {
                StorageError::new(StorageErrorKind::Serialization(e.to_string()))
            })?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Human => {
            let mut out = String::new();
            let _ = writeln!(out, "{:<24} {:>10} {:>8}", "GAMERTAG", "SCORE", "AGE");
            let _ = writeln!(out, "{:-<44}", "");
            for entry in &snapshot.entries {
                let marker = if entry.is_expired(ttl, now) {
                    " (expired)"
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "{:<24} {:>10} {:>8}{}",
                    entry.key().as_str(),
                    entry.value(),
                    describe_age(entry.age(now)),
                    marker
                );
            }
            let _ = writeln!(out, "Total: {} cached scores", snapshot.entries.len());

            if !snapshot.failures.is_empty() {
                let _ = writeln!(out);
                let _ = writeln!(out, "{:<24} {:>10}", "GAMERTAG", "FAILURES");
                let _ = writeln!(out, "{:-<35}", "");
                for (key, count) in &snapshot.failures {
                    let _ = writeln!(out, "{:<24} {:>10}", key.as_str(), count);
                }
            }
            Ok(out)
        }
    }
}
