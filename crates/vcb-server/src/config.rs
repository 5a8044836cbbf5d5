//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vcb_settings::ServerSettings;
use vcb_sync::BroadcastConfig;

/// Runtime configuration for the board server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (`0` for auto-assign).
    pub port: u16,
    /// Interval between server-initiated pings, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Disconnect clients silent for longer than this, in milliseconds.
    pub heartbeat_timeout_ms: u64,
    /// Per-connection outbound queue capacity.
    pub max_send_queue: usize,
    /// Broadcast enqueue timeout, in milliseconds.
    pub send_timeout_ms: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(s: &ServerSettings) -> Self {
        Self {
            host: s.host.clone(),
            port: s.port,
            heartbeat_interval_ms: s.heartbeat_interval_ms,
            heartbeat_timeout_ms: s.heartbeat_timeout_ms,
            max_send_queue: s.max_send_queue,
            send_timeout_ms: s.send_timeout_ms,
            max_message_size: s.max_message_size,
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ping interval.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Liveness timeout.
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    /// Connection registry tunables.
    pub fn broadcast_config(&self) -> BroadcastConfig {
        BroadcastConfig {
            queue_capacity: self.max_send_queue,
            send_timeout: Duration::from_millis(self.send_timeout_ms),
        }
    }
}
