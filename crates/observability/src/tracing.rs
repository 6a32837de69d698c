//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Resolve the filter: `RUST_LOG` wins, then `fallback`, then `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the JSON subscriber. Ignores the error when one is already set.
pub fn init(fallback: &str) {
    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_noop() {
        init(DEFAULT_FILTER);
        init("debug");
        ::tracing::info!(component = "observability", "logging initialized twice");
    }

    #[test]
    fn invalid_fallback_still_yields_a_filter() {
        let filter = env_filter("rihla_infra=[");
        assert!(!filter.to_string().is_empty());
    }
}
