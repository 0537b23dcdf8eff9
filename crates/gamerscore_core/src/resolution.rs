//! Lookup outcomes.

use gamerscore_error::FetchErrorKind;

/// A gamerscore value.
pub type Score = u64;

/// Why a lookup produced no score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    /// Key is on the permanent ignore list; no network activity happened
    Ignored,
    /// Every attempt failed
    Exhausted,
    /// Key was blank after normalization
    InvalidKey,
}

/// Typed failure returned instead of a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Why the lookup failed
    pub reason: FailureReason,
    /// Number of upstream attempts made
    pub attempts: u32,
    /// Kind of the final attempt's error, if any attempt was made
    pub last_error: Option<FetchErrorKind>,
}

impl Failure {
    /// Failure for a key on the ignore list.
    pub fn ignored() -> Self {
        Self {
            reason: FailureReason::Ignored,
            attempts: 0,
            last_error: None,
        }
    }

    /// Failure for a key that normalizes to nothing.
    pub fn invalid_key() -> Self {
        Self {
            reason: FailureReason::InvalidKey,
            attempts: 0,
            last_error: None,
        }
    }

    /// Failure after `attempts` unsuccessful attempts.
    pub fn exhausted(attempts: u32, last_error: Option<FetchErrorKind>) -> Self {
        Self {
            reason: FailureReason::Exhausted,
            attempts,
            last_error,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.reason, &self.last_error) {
            (FailureReason::Ignored, _) => write!(f, "ignored"),
            (FailureReason::InvalidKey, _) => write!(f, "invalid gamertag"),
            (FailureReason::Exhausted, Some(err)) => {
                write!(f, "exhausted after {} attempts ({})", self.attempts, err)
            }
            (FailureReason::Exhausted, None) => {
                write!(f, "exhausted after {} attempts", self.attempts)
            }
        }
    }
}

/// Result of `resolve`: a score, or a typed failure.
pub type Resolution = Result<Score, Failure>;
