//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
