use tracing_subscriber::EnvFilter;

/// Installs the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output for
/// this crate with `--verbose`.
pub fn setup_logging(verbose: bool) {
    let default_directive = if verbose { "portpeek=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
