//! reqwest-backed upstream adapter.

use crate::{FetchResponse, ScoreFetcher};
use async_trait::async_trait;
use derive_getters::Getters;
use derive_setters::Setters;
use gamerscore_core::NormalizedKey;
use gamerscore_error::{ConfigError, FetchError, FetchErrorKind, GamerscoreResult};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Upstream endpoint settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct UpstreamConfig {
    /// Site root; lookups go to `{base_url}/search/{tag}`
    #[serde(default = "default_base_url")]
    #[builder(default = "default_base_url()")]
    base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    #[builder(default = "default_user_agent()")]
    user_agent: String,

    /// Client-level request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://xboxgamertag.com".to_string()
}

fn default_user_agent() -> String {
    concat!(
        "gamerscore/",
        env!("CARGO_PKG_VERSION"),
        " (+https://github.com/crumplecup/gamerscore)"
    )
    .to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fetches gamertag profile pages over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpScoreFetcher {
    client: Client,
    base_url: Url,
}

impl HttpScoreFetcher {
    /// Build a client from upstream settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is not an absolute
    /// hierarchical URL or the TLS client cannot be built.
    pub fn new(config: &UpstreamConfig) -> GamerscoreResult<Self> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            ConfigError::new(format!("Invalid upstream base_url '{}': {}", config.base_url(), e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::new(format!(
                "Upstream base_url '{}' cannot carry a path",
                config.base_url()
            ))
            .into());
        }

        let client = Client::builder()
            .user_agent(config.user_agent().as_str())
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Lookup URL for a key, with the key percent-encoded as one path segment.
    pub fn search_url(&self, key: &NormalizedKey) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search").push(key.as_str());
        }
        url
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::new(FetchErrorKind::Timeout)
    } else {
        FetchError::new(FetchErrorKind::Transport(error.to_string()))
    }
}

#[async_trait]
impl ScoreFetcher for HttpScoreFetcher {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch(&self, key: &NormalizedKey) -> Result<FetchResponse, FetchError> {
        let url = self.search_url(key);
        debug!(%url, "Requesting profile page");

        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Upstream returned non-success status");
            return Ok(FetchResponse::new(status.as_u16(), String::new()));
        }

        let body = response.text().await.map_err(classify)?;
        Ok(FetchResponse::new(status.as_u16(), body))
    }
}
