//! Push channel: WebSocket sessions and their liveness monitoring.

pub mod heartbeat;
pub mod session;
