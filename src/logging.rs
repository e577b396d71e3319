use tracing_subscriber::EnvFilter;

/// install the global tracing subscriber
///
/// RUST_LOG wins when set, otherwise `level` from the config is used.
/// diagnostics go to stderr so stdout carries only the report lines.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).ok();
}
