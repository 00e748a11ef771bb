use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LEVEL: &str = "error";

/// Send diagnostics to stderr, filtered by `RUST_LOG`.
///
/// Quiet by default so that children own the terminal. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
