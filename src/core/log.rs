use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber on stderr, leaving stdout to the tables.
///
/// `RUST_LOG` wins when set; otherwise only `-v` turns on `fxconv` debug logs.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "fxconv=debug" } else { "off" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .pretty()
        .without_time()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
