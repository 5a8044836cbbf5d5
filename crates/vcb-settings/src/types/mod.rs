//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file may specify any subset of fields; missing fields keep
//! their compiled default.

mod board;
mod server;

pub use board::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the control board server.
///
/// Example file:
///
/// ```json
/// {
///   "server": { "port": 9000, "sendTimeoutMs": 500 },
///   "board": { "configDir": "/srv/board" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardSettings {
    /// HTTP/WebSocket server settings.
    pub server: ServerSettings,
    /// Configuration document locations.
    pub board: BoardFileSettings,
    /// Action execution settings.
    pub actions: ActionSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl BoardSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(crate::SettingsError::InvalidValue(msg.to_string()));
        if self.server.max_send_queue == 0 {
            return invalid("server.maxSendQueue must be greater than zero");
        }
        if self.server.send_timeout_ms == 0 {
            return invalid("server.sendTimeoutMs must be greater than zero");
        }
        if self.server.heartbeat_interval_ms == 0 {
            return invalid("server.heartbeatIntervalMs must be greater than zero");
        }
        if self.server.heartbeat_timeout_ms <= self.server.heartbeat_interval_ms {
            return invalid("server.heartbeatTimeoutMs must exceed server.heartbeatIntervalMs");
        }
        if self.actions.timeout_ms == 0 {
            return invalid("actions.timeoutMs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SettingsError;

    #[test]
    fn defaults_validate() {
        BoardSettings::default().validate().unwrap();
    }

    #[test]
    fn zero_queue_rejected() {
        let mut s = BoardSettings::default();
        s.server.max_send_queue = 0;
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn heartbeat_timeout_must_exceed_interval() {
        let mut s = BoardSettings::default();
        s.server.heartbeat_timeout_ms = s.server.heartbeat_interval_ms;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("heartbeatTimeoutMs"));
    }

    #[test]
    fn round_trips_through_json() {
        let s = BoardSettings::default();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["server"]["port"], 8000);
        assert_eq!(v["logging"]["level"], "info");
        let back: BoardSettings = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }
}
