//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Fails if another recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric names recorded across the board crates.

/// Action executions (counter, labels: `action_id`).
pub const ACTION_EXECUTIONS_TOTAL: &str = "action_executions_total";
/// Action failures (counter, labels: `action_id`, `error_type`).
pub const ACTION_ERRORS_TOTAL: &str = "action_errors_total";
/// Action duration seconds (histogram, labels: `action_id`).
pub const ACTION_DURATION_SECONDS: &str = "action_duration_seconds";
/// Push connections registered (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Push connections unregistered (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Currently registered push connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Connections dropped during a broadcast (counter, labels: `reason`).
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// WebSocket session lifetime seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Stage/apply/discard requests (counter, labels: `operation`, `outcome`).
pub const CONFIG_TRANSITIONS_TOTAL: &str = "config_transitions_total";
/// Generation of the active configuration (gauge).
pub const CONFIG_GENERATION: &str = "config_generation";
