//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// HTTP client crates whose debug output drowns out ours.
const QUIET_CRATES: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// Filter directives used when `RUST_LOG` is unset.
///
/// ```
/// assert!(gamerscore::default_filter(false).starts_with("info"));
/// assert!(gamerscore::default_filter(true).starts_with("debug"));
/// ```
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    QUIET_CRATES
        .iter()
        .fold(level.to_string(), |filter, krate| format!("{},{}=warn", filter, krate))
}

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` takes precedence over `verbose`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(
    verbose: bool,
    json_logs: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
