//! Key normalization.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// A lookup key in canonical form: surrounding whitespace trimmed, lower-cased.
///
/// Construction always normalizes, so two keys compare equal exactly when
/// their source strings differ only in casing or surrounding whitespace.
///
/// ```
/// use gamerscore_core::NormalizedKey;
///
/// assert_eq!(NormalizedKey::new("  FooBar "), NormalizedKey::new("foobar"));
/// assert_eq!(NormalizedKey::new(" Major Nelson ").as_str(), "major nelson");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(from = "String", into = "String")]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalize a raw key.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for NormalizedKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NormalizedKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<NormalizedKey> for String {
    fn from(key: NormalizedKey) -> Self {
        key.0
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NormalizedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A gamertag as the caller supplied it.
///
/// Display uses the original text; lookups use [`Gamertag::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{}", display)]
pub struct Gamertag {
    display: String,
    key: NormalizedKey,
}

impl Gamertag {
    /// Wrap a raw tag, keeping its casing for output.
    pub fn new(raw: impl Into<String>) -> Self {
        let display = raw.into().trim().to_string();
        let key = NormalizedKey::new(&display);
        Self { display, key }
    }

    /// Original (trimmed) casing.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Normalized lookup key.
    pub fn key(&self) -> &NormalizedKey {
        &self.key
    }
}

impl From<&str> for Gamertag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
