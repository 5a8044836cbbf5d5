//! Server network, connection, and logging settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP/WebSocket server settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Interval between WebSocket pings in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// A client silent for longer than this is disconnected.
    pub heartbeat_timeout_ms: u64,
    /// Capacity of each connection's outbound queue.
    pub max_send_queue: usize,
    /// How long a broadcast waits for room in a full queue before dropping
    /// the connection, in milliseconds.
    pub send_timeout_ms: u64,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            heartbeat_interval_ms: 30_000,
            heartbeat_timeout_ms: 90_000,
            max_send_queue: 256,
            send_timeout_ms: 2_000,
            max_message_size: 64 * 1024,
        }
    }
}

impl ServerSettings {
    /// Ping interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Liveness timeout as a [`Duration`].
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    /// Broadcast enqueue timeout as a [`Duration`].
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level (most verbose).
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level (default).
    #[default]
    Info,
    /// Warning-level.
    Warn,
    /// Error-level.
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr. `RUST_LOG` takes precedence.
    pub level: LogLevel,
    /// Emit JSON lines instead of the compact human format.
    pub json: bool,
}
