//! Fake upstream adapters shared by the lookup tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gamerscore_core::NormalizedKey;
use gamerscore_error::{FetchError, FetchErrorKind};
use gamerscore_lookup::{FetchResponse, LookupState, Resolver, ScoreFetcher};
use gamerscore_rate_limit::{FetchGate, GateConfig, RetryConfig};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// A page the parser accepts for `score`.
pub fn profile_page(score: &str) -> String {
    format!(
        r#"<html><body><div class="profile-detail-item"><span>Gamerscore</span><h3>{}</h3></div></body></html>"#,
        score
    )
}

/// Replays a fixed script of answers, then fails with a transport error.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: parking_lot::Mutex<VecDeque<Result<FetchResponse, FetchErrorKind>>>,
    calls: parking_lot::Mutex<Vec<(NormalizedKey, Instant)>>,
}

impl ScriptedFetcher {
    pub fn new(script: impl IntoIterator<Item = Result<FetchResponse, FetchErrorKind>>) -> Self {
        Self {
            script: parking_lot::Mutex::new(script.into_iter().collect()),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Always answers 200 with a page holding `score`.
    pub fn always_ok(score: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(FetchResponse::new(200, profile_page(score)))))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().iter().map(|(_, at)| *at).collect()
    }

    pub fn called_keys(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|(key, _)| key.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl ScoreFetcher for ScriptedFetcher {
    async fn fetch(&self, key: &NormalizedKey) -> Result<FetchResponse, FetchError> {
        self.calls.lock().push((key.clone(), Instant::now()));
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(kind)) => Err(FetchError::new(kind)),
            None => Err(FetchError::new(FetchErrorKind::Transport(
                "connection refused".to_string(),
            ))),
        }
    }
}

/// Tracks how many fetches overlap, sleeping `hold` inside each.
pub struct ConcurrencyProbe {
    hold: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreFetcher for ConcurrencyProbe {
    async fn fetch(&self, _key: &NormalizedKey) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(FetchResponse::new(200, profile_page("1,000")))
    }
}

/// Signals when a fetch starts, then never finishes on its own.
#[derive(Default)]
pub struct HangingFetcher {
    pub started: Notify,
}

#[async_trait]
impl ScoreFetcher for HangingFetcher {
    async fn fetch(&self, _key: &NormalizedKey) -> Result<FetchResponse, FetchError> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(FetchResponse::new(200, profile_page("1")))
    }
}

pub fn resolver_with(fetcher: Arc<dyn ScoreFetcher>) -> Resolver {
    Resolver::new(
        LookupState::default(),
        FetchGate::new(&GateConfig::default()),
        fetcher,
        RetryConfig::default(),
    )
}
