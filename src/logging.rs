//! Logging setup for applications embedding the pipeline
//!
//! The library itself only emits `tracing` events; this installs a stderr
//! subscriber for binaries and tests. Configurable via `RUST_LOG`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "tile_geometry=info";

/// Install a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

/// Whether timing diagnostics were requested through `PROFILE_TIMING`
pub fn profile_timing() -> bool {
    std::env::var("PROFILE_TIMING").is_ok()
}
