//! Top-level error wrapper types.

use crate::{ConfigError, FetchError, StorageError};

/// Union of every error the workspace can surface.
///
/// # Examples
///
/// ```
/// use gamerscore_error::{GamerscoreError, ConfigError};
///
/// let err: GamerscoreError = ConfigError::new("bad value").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GamerscoreErrorKind {
    /// Upstream fetch error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Persistent state error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Gamerscore error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Gamerscore Error: {}", _0)]
pub struct GamerscoreError(Box<GamerscoreErrorKind>);

impl GamerscoreError {
    /// Create a new error from a kind.
    pub fn new(kind: GamerscoreErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GamerscoreErrorKind {
        &self.0
    }
}

impl<T> From<T> for GamerscoreError
where
    T: Into<GamerscoreErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for gamerscore operations.
pub type GamerscoreResult<T> = std::result::Result<T, GamerscoreError>;
