//! Structured logging setup with `tracing`.
//!
//! Every crate logs through `tracing` macros with structured fields
//! (`button_id`, `action_id`, `conn_id`, ...). The binary installs a single
//! `fmt` subscriber at startup via [`init_subscriber`].

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG`, when set, takes precedence over `level`.
///
/// # Arguments
///
/// * `level` - Minimum log level or filter directive (e.g. `"info"`,
///   `"vcb_sync=debug,info"`).
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init is a no-op if a global subscriber is already set
    let _ = subscriber.try_init();
}

/// Initialize the global tracing subscriber with JSON-formatted stderr output.
///
/// Intended for deployments that ship logs to a collector.
pub fn init_json_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = subscriber.try_init();
}
