//! Periodic expiry sweep and snapshot persistence.

use crate::LookupState;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use futures::FutureExt;
use gamerscore_storage::PersistentStore;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

/// Sweep scheduling settings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct SweeperConfig {
    /// Seconds between sweeps
    #[serde(default = "default_interval_secs")]
    #[builder(default = "default_interval_secs()")]
    interval_secs: u64,

    /// Save a snapshot after every sweep
    #[serde(default = "default_persist_on_sweep")]
    #[builder(default = "default_persist_on_sweep()")]
    persist_on_sweep: bool,
}

fn default_interval_secs() -> u64 {
    600 // 10 minutes
}

fn default_persist_on_sweep() -> bool {
    true
}

impl SweeperConfig {
    /// Interval as a duration, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            persist_on_sweep: default_persist_on_sweep(),
        }
    }
}

/// What one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired cache entries evicted
    pub evicted: usize,
    /// Failure counters dropped for keys with no cache entry
    pub forgotten: usize,
}

/// Evicts expired cache entries on a fixed interval.
///
/// After each eviction pass, failure counters for keys that no longer have a
/// cache entry are dropped, and the state is saved when a store is attached
/// and `persist_on_sweep` is set. A failing cycle is logged and the next one
/// runs on schedule.
pub struct Sweeper {
    state: LookupState,
    config: SweeperConfig,
    store: Option<Arc<dyn PersistentStore>>,
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl Sweeper {
    /// Sweeper over shared state without persistence.
    pub fn new(state: LookupState, config: SweeperConfig) -> Self {
        Self {
            state,
            config,
            store: None,
        }
    }

    /// Attach a store for snapshots after each sweep.
    pub fn with_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sweep settings.
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Evict everything expired as of `now` and drop orphaned failure counters.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let cache = self.state.cache();
        let evicted = cache.evict_expired(now);
        let forgotten = self
            .state
            .tracker()
            .retain(|key| cache.contains_key(key.as_str()));

        if forgotten > 0 {
            info!(forgotten, "Dropped failure counters without cache entries");
        }
        SweepReport { evicted, forgotten }
    }

    /// Run one full cycle: sweep, then persist if configured.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> SweepReport {
        let report = self.sweep_at(Utc::now());

        if self.config.persist_on_sweep
            && let Some(store) = &self.store
        {
            match store.save(&self.state.snapshot()).await {
                Ok(()) => debug!("Saved snapshot after sweep"),
                Err(e) => error!(error = %e, "Failed to save snapshot after sweep"),
            }
        }

        report
    }

    /// Start sweeping in the background.
    ///
    /// The first cycle runs one interval after spawning.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = self.config.interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            info!(interval_secs = period.as_secs(), "Sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(panic) = AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
                            error!(?panic, "Sweep cycle panicked");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Sweeper stopped");
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the sweeper and wait for it to exit.
    ///
    /// A cycle already in progress finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Sweeper task ended abnormally");
        }
    }
}
