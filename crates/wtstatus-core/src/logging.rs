use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the process-wide JSON subscriber writing to stderr.
///
/// `RUST_LOG` wins when set. Otherwise `quiet` selects `warn`, else `info`.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));

    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn default_directive(quiet: bool) -> &'static str {
    if quiet { "warn" } else { "info" }
}
