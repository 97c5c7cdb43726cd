use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// - Level filtering comes from `RUST_LOG` (defaults to `info` if not set)
/// - Output goes to stderr; stdout carries the progress report
///
/// Calling it more than once is harmless: later calls leave the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
