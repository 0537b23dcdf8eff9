//! Cache-first score resolution with serialized, retried upstream fetches.

use crate::{LookupState, ScoreFetcher, parse_gamerscore};
use gamerscore_core::{Failure, NormalizedKey, Resolution, Score};
use gamerscore_error::{FetchError, FetchErrorKind};
use gamerscore_rate_limit::{FetchGate, RetryConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Resolves tags to gamerscores.
///
/// Each call checks the cache, then runs up to `max_attempts` upstream
/// attempts. Every attempt waits its turn at the process-wide [`FetchGate`],
/// holds it for the request and body read only, and parses the page after
/// releasing it. Failures of any kind bump the key's failure counter, which
/// feeds the backoff before the next attempt and persists across calls.
///
/// `resolve` never returns an error: the outcome is a score or a typed
/// [`Failure`]. Dropping a `resolve` future mid-attempt releases the gate and
/// records nothing for the interrupted attempt.
#[derive(Clone)]
pub struct Resolver {
    state: LookupState,
    gate: FetchGate,
    fetcher: Arc<dyn ScoreFetcher>,
    retry: RetryConfig,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("state", &self.state)
            .field("gate", &self.gate)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Resolver over shared state, a gate and an upstream adapter.
    ///
    /// Share one gate between every resolver in a process.
    pub fn new(
        state: LookupState,
        gate: FetchGate,
        fetcher: Arc<dyn ScoreFetcher>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            state,
            gate,
            fetcher,
            retry,
        }
    }

    /// The cache and tracker this resolver writes to.
    pub fn state(&self) -> &LookupState {
        &self.state
    }

    /// The fetch gate this resolver queues on.
    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    /// Retry settings.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Resolve a tag to its score.
    #[instrument(skip(self))]
    pub async fn resolve(&self, tag: &str) -> Resolution {
        let key = NormalizedKey::new(tag);
        if key.is_empty() {
            warn!("Refusing to look up a blank gamertag");
            return Err(Failure::invalid_key());
        }

        if let Some(score) = self.state.cache().get(key.as_str()) {
            debug!(%key, score, "Cache hit");
            return Ok(score);
        }
        debug!(%key, "Cache miss");

        let max_attempts = *self.retry.max_attempts();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let wait = self.wait_before(&key, attempt);
            debug!(%key, attempt, delay_ms = wait.as_millis() as u64, "Waiting before attempt");
            tokio::time::sleep(wait).await;

            match self.attempt(&key).await {
                Ok(score) => {
                    self.state.cache().put(key.as_str(), score);
                    self.state.tracker().reset(key.as_str());
                    info!(%key, score, attempt, "Resolved gamerscore");
                    return Ok(score);
                }
                Err(e) => {
                    let failures = self.state.tracker().record_failure(key.as_str());
                    warn!(%key, attempt, failures, error = %e.kind, "Lookup attempt failed");

                    if e.kind.is_rate_limited() && attempt < max_attempts {
                        let pause = self.retry.rate_limit_pause();
                        warn!(%key, pause_ms = pause.as_millis() as u64, "Rate limited by upstream");
                        tokio::time::sleep(pause).await;
                    }
                    last_error = Some(e.kind);
                }
            }
        }

        warn!(%key, attempts = max_attempts, "Lookup exhausted all attempts");
        Err(Failure::exhausted(max_attempts, last_error))
    }

    /// Wait before the numbered attempt.
    ///
    /// The first attempt waits the politeness throttle, stretched to the
    /// backoff delay if the key already has failures on record. Later
    /// attempts wait the backoff delay for the current failure count.
    fn wait_before(&self, key: &NormalizedKey, attempt: u32) -> Duration {
        let policy = self.retry.backoff_policy();
        let failures = self.state.tracker().failure_count(key.as_str());
        if attempt == 1 {
            if failures == 0 {
                self.retry.throttle()
            } else {
                self.retry.throttle().max(policy.delay(failures))
            }
        } else {
            policy.delay(failures)
        }
    }

    async fn attempt(&self, key: &NormalizedKey) -> Result<Score, FetchError> {
        let response = {
            let _guard = self.gate.acquire().await;
            let response =
                match tokio::time::timeout(self.retry.attempt_timeout(), self.fetcher.fetch(key))
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => return Err(FetchError::new(FetchErrorKind::Timeout)),
                };
            if !response.is_success() {
                return Err(FetchError::new(FetchErrorKind::from_status(response.status)));
            }
            response
        };

        parse_gamerscore(&response.body)
    }
}
