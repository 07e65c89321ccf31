//! Log subscriber setup

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for the oems
/// crates when `verbose`. Calling this twice keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "warn,oems_runtime=debug,oems_topology=debug,oems_transport=debug"
    } else {
        "warn"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
