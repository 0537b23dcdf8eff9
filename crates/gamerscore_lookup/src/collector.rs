//! Batch lookups that honour the permanent ignore list.

use crate::Resolver;
use derive_getters::Getters;
use derive_setters::Setters;
use gamerscore_core::{Failure, FailureReason, Gamertag, NormalizedKey, Resolution, Score};
use gamerscore_storage::IgnoreRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Collector behaviour settings.
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
pub struct CollectorConfig {
    /// Scores strictly below this are flagged as low
    #[serde(default = "default_low_score_threshold")]
    #[builder(default = "default_low_score_threshold()")]
    low_score_threshold: Score,

    /// Record each new tag in the ignore list before resolving it
    #[serde(default = "default_ignore_after_lookup")]
    #[builder(default = "default_ignore_after_lookup()")]
    ignore_after_lookup: bool,
}

fn default_low_score_threshold() -> Score {
    2000
}

fn default_ignore_after_lookup() -> bool {
    true
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            low_score_threshold: default_low_score_threshold(),
            ignore_after_lookup: default_ignore_after_lookup(),
        }
    }
}

/// Outcome of collecting one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    /// The tag as it was supplied
    pub tag: Gamertag,
    /// Score or failure
    pub resolution: Resolution,
    /// Whether the score fell below the low-score threshold
    pub low_score: bool,
}

/// Split a free-form tag list on commas and whitespace.
///
/// ```
/// use gamerscore_lookup::split_tags;
///
/// let tags = split_tags("Major Nelson, e  ,,f");
/// let names: Vec<_> = tags.iter().map(|t| t.display()).collect();
/// assert_eq!(names, ["Major", "Nelson", "e", "f"]);
/// ```
pub fn split_tags(input: &str) -> Vec<Gamertag> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(Gamertag::new)
        .collect()
}

/// Resolves candidate tags once each, skipping anything already handled.
///
/// A tag on the ignore list yields [`FailureReason::Ignored`] without any
/// network activity. New tags are added to the list before lookup when
/// `ignore_after_lookup` is set, so a tag is attempted at most once for the
/// life of the ignore file.
#[derive(Debug, Clone)]
pub struct Collector {
    resolver: Arc<Resolver>,
    registry: Arc<IgnoreRegistry>,
    config: CollectorConfig,
}

impl Collector {
    /// Collector over a resolver and ignore list.
    pub fn new(
        resolver: Arc<Resolver>,
        registry: Arc<IgnoreRegistry>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            resolver,
            registry,
            config,
        }
    }

    /// Collector settings.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Resolve one tag, honouring the ignore list.
    #[instrument(skip(self, tag), fields(tag = %tag))]
    pub async fn process(&self, tag: Gamertag) -> LookupReport {
        let key = tag.key().as_str();

        if self.registry.contains(key) {
            debug!("Tag already handled, skipping");
            return self.report(tag, Err(Failure::ignored()));
        }

        if self.config.ignore_after_lookup
            && let Err(e) = self.registry.add(tag.display()).await
        {
            error!(error = %e, "Failed to record tag in ignore list");
        }

        let resolution = self.resolver.resolve(tag.display()).await;

        if matches!(&resolution, Err(f) if f.reason == FailureReason::Exhausted)
            && self.registry.contains(key)
        {
            self.resolver.state().tracker().reset(key);
            debug!("Dropped failure counter for ignored tag");
        }

        self.report(tag, resolution)
    }

    /// Resolve a batch in order, sending each report to `sink`.
    ///
    /// Tags repeated within the batch are processed once. Stops early if the
    /// sink closes. Returns the number of reports sent.
    #[instrument(skip_all)]
    pub async fn process_batch(
        &self,
        tags: Vec<Gamertag>,
        sink: &mpsc::Sender<LookupReport>,
    ) -> usize {
        let mut seen: HashSet<NormalizedKey> = HashSet::new();
        let mut sent = 0;

        for tag in tags {
            if !seen.insert(tag.key().clone()) {
                debug!(tag = %tag, "Duplicate tag in batch");
                continue;
            }
            let report = self.process(tag).await;
            if sink.send(report).await.is_err() {
                warn!("Report sink closed, stopping batch");
                break;
            }
            sent += 1;
        }

        info!(sent, "Batch complete");
        sent
    }

    /// Consume tags from a channel until it closes.
    pub fn spawn(
        self,
        mut tags: mpsc::Receiver<Gamertag>,
        sink: mpsc::Sender<LookupReport>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(tag) = tags.recv().await {
                let report = self.process(tag).await;
                if sink.send(report).await.is_err() {
                    warn!("Report sink closed, stopping collector");
                    break;
                }
            }
            debug!("Collector input closed");
        })
    }

    fn report(&self, tag: Gamertag, resolution: Resolution) -> LookupReport {
        let low_score = matches!(resolution, Ok(score) if score < self.config.low_score_threshold);
        if low_score {
            warn!(tag = %tag, "Low gamerscore");
        }
        LookupReport {
            tag,
            resolution,
            low_score,
        }
    }
}
