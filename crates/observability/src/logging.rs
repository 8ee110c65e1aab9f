//! JSON log output with an `EnvFilter`.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from a raw `RUST_LOG` value.
pub fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init() {
    let raw = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    // A second init (e.g. several tests in one binary) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from(raw.as_deref()))
        .json()
        .with_current_span(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
