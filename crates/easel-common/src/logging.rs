use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "EASEL_LOG";

/// Initialize structured logging with environment filter.
/// Set EASEL_LOG=debug (or trace, info, warn, error) for verbosity control.
pub fn init_logging() {
    init_logging_with("info");
}

/// Same as [`init_logging`] but falls back to `default_filter` when
/// EASEL_LOG is unset or unparsable. Calling it twice is harmless.
pub fn init_logging_with(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
