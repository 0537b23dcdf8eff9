//! The seam between the resolver and the upstream.

use async_trait::async_trait;
use gamerscore_core::NormalizedKey;
use gamerscore_error::FetchError;

/// Raw upstream answer for one request.
///
/// `body` is only read for success statuses; adapters may leave it empty
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl FetchResponse {
    /// Response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a single upstream request for a key.
///
/// Implementations perform no retries, caching or locking of their own; the
/// resolver wraps every call in the fetch gate and the retry loop. Transport
/// failures are returned as errors, any HTTP answer as a [`FetchResponse`].
#[async_trait]
pub trait ScoreFetcher: Send + Sync {
    /// Request the profile page for `key`.
    async fn fetch(&self, key: &NormalizedKey) -> Result<FetchResponse, FetchError>;
}
