//! Gamerscore resolution on top of the cache, gate and storage crates.
//!
//! # Flow
//!
//! ```text
//! resolve(tag) ─▶ ScoreCache hit? ─▶ score
//!        │
//!        ▼ miss
//!   wait (throttle / backoff) ─▶ FetchGate ─▶ ScoreFetcher ─▶ release ─▶ parse
//!        ▲                                                              │
//!        └──────────── failure: BackoffTracker += 1 ◀──────────────────┘
//! ```
//!
//! [`Sweeper`] evicts expired scores in the background and persists state,
//! [`Collector`] runs batches of tags through the ignore list, and
//! [`LookupService`] wires all of it from a [`GamerscoreConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use gamerscore_lookup::{GamerscoreConfig, LookupService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = LookupService::start(GamerscoreConfig::load()?).await?;
//! match service.resolver().resolve("Major Nelson").await {
//!     Ok(score) => println!("Gamerscore: {}", score),
//!     Err(failure) => println!("No score: {}", failure),
//! }
//! service.persist().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod collector;
mod config;
mod fetcher;
mod http;
mod parse;
mod resolver;
mod service;
mod state;
mod sweeper;

pub use collector::{
    Collector, CollectorConfig, CollectorConfigBuilder, LookupReport, split_tags,
};
pub use config::{GamerscoreConfig, StorageConfig, StorageConfigBuilder};
pub use fetcher::{FetchResponse, ScoreFetcher};
pub use http::{HttpScoreFetcher, UpstreamConfig, UpstreamConfigBuilder};
pub use parse::parse_gamerscore;
pub use resolver::Resolver;
pub use service::LookupService;
pub use state::LookupState;
pub use sweeper::{SweepReport, Sweeper, SweeperConfig, SweeperConfigBuilder, SweeperHandle};
