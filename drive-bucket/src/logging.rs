//! Structured JSON logging for the CLI.

use tracing_subscriber::EnvFilter;

use drive_bucket_core::config::DEFAULT_LOG_LEVEL;

/// Filter for `level`, falling back to the default level when it is blank or
/// does not parse.
pub fn build_filter(level: &str) -> EnvFilter {
    let level = level.trim();
    if level.is_empty() {
        return EnvFilter::new(DEFAULT_LOG_LEVEL);
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global JSON subscriber. A second call is a no-op.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(build_filter(level))
        .with_current_span(true)
        .try_init();
}
