//! Error types for the gamerscore lookup service.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use gamerscore_error::{FetchError, FetchErrorKind, GamerscoreResult};
//!
//! fn fetch_page() -> GamerscoreResult<String> {
//!     Err(FetchError::new(FetchErrorKind::UpstreamStatus(503)))?
//! }
//!
//! match fetch_page() {
//!     Ok(body) => println!("Got {} bytes", body.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod fetch;
mod storage;

pub use config::ConfigError;
pub use error::{GamerscoreError, GamerscoreErrorKind, GamerscoreResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use storage::{StorageError, StorageErrorKind};
