//! Upstream fetch error types.
//!
//! Every way a single lookup attempt can fail maps onto one [`FetchErrorKind`].
//! The resolver treats all kinds as the same failure class for retry purposes;
//! only [`FetchErrorKind::RateLimited`] carries extra scheduling weight.

/// HTTP status the upstream uses to signal throttling.
pub const RATE_LIMITED_STATUS: u16 = 429;

/// Kinds of failure for a single upstream attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// Connection could not be established or the body could not be read
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// Request did not complete within the attempt deadline
    #[display("Request timed out")]
    Timeout,
    /// Upstream answered with a non-success status
    #[display("Upstream returned HTTP {}", _0)]
    UpstreamStatus(u16),
    /// Upstream answered 429 Too Many Requests
    #[display("Upstream rate limited the request")]
    RateLimited,
    /// Response body did not contain a recognisable score
    #[display("Could not parse score: {}", _0)]
    Parse(String),
}

impl FetchErrorKind {
    /// Classify a non-success HTTP status.
    ///
    /// ```
    /// use gamerscore_error::FetchErrorKind;
    ///
    /// assert_eq!(FetchErrorKind::from_status(429), FetchErrorKind::RateLimited);
    /// assert_eq!(FetchErrorKind::from_status(404), FetchErrorKind::UpstreamStatus(404));
    /// ```
    pub fn from_status(status: u16) -> Self {
        if status == RATE_LIMITED_STATUS {
            FetchErrorKind::RateLimited
        } else {
            FetchErrorKind::UpstreamStatus(status)
        }
    }

    /// Whether this failure was an explicit throttling response.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchErrorKind::RateLimited)
    }
}

/// Upstream fetch error with location tracking.
///
/// # Examples
///
/// ```
/// use gamerscore_error::{FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::Timeout);
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new fetch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FetchErrorKind {
        &self.kind
    }
}
