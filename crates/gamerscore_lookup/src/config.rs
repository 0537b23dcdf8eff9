//! Layered configuration for the lookup service.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from gamerscore.toml)
//! - `~/.config/gamerscore/gamerscore.toml`
//! - `./gamerscore.toml`
//! - `GAMERSCORE__SECTION__FIELD` environment variables

use crate::{CollectorConfig, SweeperConfig, UpstreamConfig};
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use derive_setters::Setters;
use gamerscore_cache::ScoreCacheConfig;
use gamerscore_error::{ConfigError, GamerscoreError, GamerscoreResult};
use gamerscore_rate_limit::{GateConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Locations of the durable state files.
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
pub struct StorageConfig {
    /// JSON snapshot of cached scores and failure counts
    #[serde(default = "default_cache_file")]
    #[builder(default = "default_cache_file()")]
    cache_file: PathBuf,

    /// Newline-delimited ignore list
    #[serde(default = "default_ignore_file")]
    #[builder(default = "default_ignore_file()")]
    ignore_file: PathBuf,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("gamerscore_cache.json")
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from("checked_gamertags.txt")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
            ignore_file: default_ignore_file(),
        }
    }
}

/// Top-level configuration.
///
/// # Example
///
/// ```no_run
/// use gamerscore_lookup::GamerscoreConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GamerscoreConfig::load()?;
/// println!("TTL: {}s", config.cache().ttl_secs());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct GamerscoreConfig {
    /// Score cache settings
    #[serde(default)]
    cache: ScoreCacheConfig,
    /// Expiry sweep settings
    #[serde(default)]
    sweeper: SweeperConfig,
    /// Retry loop settings
    #[serde(default)]
    retry: RetryConfig,
    /// Fetch gate settings
    #[serde(default)]
    gate: GateConfig,
    /// Upstream endpoint settings
    #[serde(default)]
    upstream: UpstreamConfig,
    /// State file locations
    #[serde(default)]
    storage: StorageConfig,
    /// Collector settings
    #[serde(default)]
    collector: CollectorConfig,
}

impl GamerscoreConfig {
    /// Load configuration from a specific file path.
    ///
    /// Fields missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> GamerscoreResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                GamerscoreError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GamerscoreError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> GamerscoreResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../gamerscore.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/gamerscore/gamerscore.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("gamerscore").required(false))
            .add_source(
                Environment::with_prefix("GAMERSCORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .map_err(|e| {
                GamerscoreError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GamerscoreError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
