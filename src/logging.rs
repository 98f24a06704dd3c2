use tracing_subscriber::EnvFilter;

/// Initialise logging. `RUST_LOG` wins when set; otherwise the level is
/// `debug` when requested in the config and `info` if not.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
