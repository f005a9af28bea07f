//! Internal diagnostics through `tracing`.
//!
//! Routed log entries never pass through here. This subscriber only carries the
//! library's own messages (level fallbacks, counter conflicts, sink creation).

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, default `warn`.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_diagnostics() -> bool {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
