//! JSON file snapshot backend.
//!
//! The file holds one object per cached tag plus a parallel failure map:
//!
//! ```json
//! {
//!   "scores": { "player1": { "score": 1234, "timestamp": 1700000000.5 } },
//!   "failures": { "player2": 2 }
//! }
//! ```
//!
//! Timestamps are Unix seconds with millisecond precision.

use crate::{PersistentStore, StoreSnapshot};
use chrono::{DateTime, Utc};
use gamerscore_cache::CacheEntry;
use gamerscore_core::{NormalizedKey, Score};
use gamerscore_error::{GamerscoreResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    scores: BTreeMap<String, PersistedScore>,
    #[serde(default)]
    failures: BTreeMap<String, u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedScore {
    score: Score,
    timestamp: f64,
}

fn to_unix_seconds(at: &DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

impl From<&StoreSnapshot> for PersistedState {
    fn from(snapshot: &StoreSnapshot) -> Self {
        let scores = snapshot
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.key().as_str().to_string(),
                    PersistedScore {
                        score: *entry.value(),
                        timestamp: to_unix_seconds(entry.observed_at()),
                    },
                )
            })
            .collect();

        let failures = snapshot
            .failures
            .iter()
            .map(|(key, count)| (key.as_str().to_string(), *count))
            .collect();

        Self { scores, failures }
    }
}

impl PersistedState {
    fn into_snapshot(self) -> StoreSnapshot {
        let mut entries = Vec::with_capacity(self.scores.len());
        for (key, persisted) in self.scores {
            match from_unix_seconds(persisted.timestamp) {
                Some(observed_at) => entries.push(CacheEntry::new(
                    NormalizedKey::new(&key),
                    persisted.score,
                    observed_at,
                )),
                None => tracing::warn!(
                    key = %key,
                    timestamp = persisted.timestamp,
                    "Skipping cache entry with invalid timestamp"
                ),
            }
        }

        let failures = self
            .failures
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(key, count)| (NormalizedKey::new(&key), count))
            .collect();

        StoreSnapshot { entries, failures }
    }
}

/// Snapshot store backed by a single JSON file.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-save leaves the previous snapshot intact. Concurrent saves through
/// the same store (or its clones) are serialized.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    // Shared by clones; one save at a time owns the temp file.
    save_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Create a store for the given file path. Nothing is touched until
    /// the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl PersistentStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> GamerscoreResult<StoreSnapshot> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No persisted state found");
                return Ok(StoreSnapshot::default());
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
                .into());
            }
        };

        let state: PersistedState = serde_json::from_str(&content).map_err(|e| {
            StorageError::new(StorageErrorKind::Deserialization(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        let snapshot = state.into_snapshot();
        tracing::info!(
            entries = snapshot.entries.len(),
            failures = snapshot.failures.len(),
            "Loaded persisted state"
        );
        Ok(snapshot)
    }

    #[tracing::instrument(
        skip(self, snapshot),
        fields(path = %self.path.display(), entries = snapshot.entries.len())
    )]
    async fn save(&self, snapshot: &StoreSnapshot) -> GamerscoreResult<()> {
        let json = serde_json::to_string_pretty(&PersistedState::from(snapshot))
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let _save = self.save_lock.lock().await;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )))
        })?;

        tracing::debug!(failures = snapshot.failures.len(), "Saved persisted state");
        Ok(())
    }
}
