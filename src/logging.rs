//! Logging setup.
//!
//! Everything goes to stderr: stdout belongs to the plugin handshake and
//! must never carry anything else. Filtering follows `RUST_LOG` when set.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Initialize logging with `info` as the default level.
///
/// Panics if a global subscriber is already installed; call once, from main.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with the given default level, overridable through
/// `RUST_LOG`.
pub fn init_logging_with_default(default_level: &str) {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Like [`init_logging`], but does nothing when a subscriber is already
/// installed. For tests, where multiple cases may try to initialize.
pub fn try_init_logging() -> bool {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
