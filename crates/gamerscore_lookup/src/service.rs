//! Process-level wiring of the lookup components.

use crate::{
    Collector, GamerscoreConfig, HttpScoreFetcher, LookupState, Resolver, ScoreFetcher, Sweeper,
    SweeperHandle,
};
use gamerscore_error::GamerscoreResult;
use gamerscore_rate_limit::FetchGate;
use gamerscore_storage::{IgnoreRegistry, JsonFileStore, PersistentStore};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Everything one lookup process owns.
///
/// Built once at startup. Persisted state is restored on construction, and
/// storage problems degrade to empty, unpersisted state instead of failing.
#[derive(Clone)]
pub struct LookupService {
    config: GamerscoreConfig,
    state: LookupState,
    resolver: Arc<Resolver>,
    registry: Arc<IgnoreRegistry>,
    store: Arc<dyn PersistentStore>,
}

impl std::fmt::Debug for LookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupService")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl LookupService {
    /// Start a service against the real upstream and the configured files.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    #[instrument(skip(config))]
    pub async fn start(config: GamerscoreConfig) -> GamerscoreResult<Self> {
        let fetcher = Arc::new(HttpScoreFetcher::new(config.upstream())?);
        let store = Arc::new(JsonFileStore::new(config.storage().cache_file()));
        Ok(Self::with_parts(config, fetcher, store).await)
    }

    /// Start a service with an explicit upstream adapter and store.
    ///
    /// The ignore list is still opened from the configured path, falling back
    /// to an in-memory list if that fails.
    pub async fn with_parts(
        config: GamerscoreConfig,
        fetcher: Arc<dyn ScoreFetcher>,
        store: Arc<dyn PersistentStore>,
    ) -> Self {
        let state = LookupState::new(*config.cache());
        state.restore(store.load_or_default().await);

        let registry = match IgnoreRegistry::open(config.storage().ignore_file()).await {
            Ok(registry) => registry,
            Err(e) => {
                error!(error = %e, "Ignore list unavailable, continuing without persistence");
                IgnoreRegistry::in_memory()
            }
        };

        let gate = FetchGate::new(config.gate());
        let resolver = Resolver::new(state.clone(), gate, fetcher, config.retry().clone());

        info!(
            cached = state.cache().len(),
            ignored = registry.len(),
            "Lookup service ready"
        );

        Self {
            config,
            state,
            resolver: Arc::new(resolver),
            registry: Arc::new(registry),
            store,
        }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &GamerscoreConfig {
        &self.config
    }

    /// Shared cache and failure counters.
    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// The resolver.
    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// The ignore list.
    pub fn registry(&self) -> &Arc<IgnoreRegistry> {
        &self.registry
    }

    /// A collector over this service's resolver and ignore list.
    pub fn collector(&self) -> Collector {
        Collector::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.registry),
            *self.config.collector(),
        )
    }

    /// A sweeper over this service's state that persists to its store.
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.state.clone(), *self.config.sweeper())
            .with_store(Arc::clone(&self.store))
    }

    /// Spawn the background sweeper.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        self.sweeper().spawn()
    }

    /// Save the current state.
    ///
    /// # Errors
    ///
    /// Returns the store's error; callers at shutdown usually log and move on.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> GamerscoreResult<()> {
        self.store.save(&self.state.snapshot()).await?;
        info!("Saved lookup state");
        Ok(())
    }
}
