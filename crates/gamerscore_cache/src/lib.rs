//! Score caching with TTL expiry.
//!
//! This crate provides the in-memory cache that short-circuits repeat lookups
//! so the upstream only sees a tag once per TTL window.

#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, ScoreCache, ScoreCacheConfig, ScoreCacheConfigBuilder};
