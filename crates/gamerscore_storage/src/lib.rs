//! Durable state for the gamerscore lookup service.
//!
//! Two files survive restarts:
//!
//! - a JSON snapshot of cached scores and failure counts, written by a
//!   [`PersistentStore`] (see [`JsonFileStore`])
//! - a newline-delimited ignore list, owned by [`IgnoreRegistry`], which is
//!   only ever appended to
//!
//! # Example
//!
//! ```rust,no_run
//! use gamerscore_storage::{JsonFileStore, PersistentStore, StoreSnapshot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonFileStore::new("/tmp/gamerscore/cache.json");
//! let snapshot = store.load().await?;
//! println!("{} cached scores", snapshot.entries.len());
//! store.save(&snapshot).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use gamerscore_cache::CacheEntry;
use gamerscore_core::NormalizedKey;
use gamerscore_error::GamerscoreResult;
use std::collections::BTreeMap;

mod ignore;
mod json_file;

pub use gamerscore_error::{StorageError, StorageErrorKind};
pub use ignore::IgnoreRegistry;
pub use json_file::JsonFileStore;

/// Point-in-time copy of the cache and failure counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Cached scores
    pub entries: Vec<CacheEntry>,
    /// Consecutive failure counts
    pub failures: BTreeMap<NormalizedKey, u32>,
}

impl StoreSnapshot {
    /// Whether the snapshot holds no state.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.failures.is_empty()
    }
}

/// Trait for durable snapshot backends.
///
/// Implementations only encode and decode state; they never decide what the
/// state should be.
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read the last saved snapshot.
    ///
    /// A store that has never been written returns an empty snapshot.
    async fn load(&self) -> GamerscoreResult<StoreSnapshot>;

    /// Replace the saved snapshot.
    async fn save(&self, snapshot: &StoreSnapshot) -> GamerscoreResult<()>;

    /// Read the snapshot, logging and falling back to empty state on error.
    async fn load_or_default(&self) -> StoreSnapshot {
        match self.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load persisted state, starting empty");
                StoreSnapshot::default()
            }
        }
    }
}
