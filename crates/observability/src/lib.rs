//! Tracing/logging setup shared by every binary and test harness.

/// Initialize process-wide logging with the `info` default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
