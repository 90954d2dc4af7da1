//! Diagnostic output for the binary.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `tracing` subscriber filtered by `filter`.
///
/// Invalid directives fall back to `warn`. Calling this more than once is
/// harmless; only the first subscriber is kept.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
