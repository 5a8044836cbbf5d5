//! Connection identifiers.
//!
//! Assigned by the connection registry at registration time and never
//! reused. They are prefixed UUID v7 strings so log lines sort by attach time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CONNECTION_PREFIX: &str = "conn_";

/// Unique identifier for an attached push connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Allocate a fresh, time-ordered ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("{CONNECTION_PREFIX}{}", Uuid::now_v7()))
    }

    /// The ID as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
