//! Core data types shared across the gamerscore workspace.
//!
//! - [`NormalizedKey`]: the trimmed, lower-cased form every map and ignore check uses
//! - [`Gamertag`]: a caller-supplied tag that keeps its original casing for display
//! - [`Failure`] / [`FailureReason`]: the typed outcome of an unsuccessful lookup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod key;
mod resolution;

pub use key::{Gamertag, NormalizedKey};
pub use resolution::{Failure, FailureReason, Resolution, Score};
