//! # vcb-server
//!
//! Axum HTTP + `WebSocket` front end for the control board.
//!
//! - HTTP endpoints: health, metrics, board view, configuration
//!   stage/apply/discard, button content pushes, button presses
//! - `WebSocket` push channel: per-client sessions with heartbeat
//! - Initial configuration loading from disk
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod health;
pub mod loader;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use api::ApiError;
pub use config::ServerConfig;
pub use loader::{BoardConfigLoader, LoadError};
pub use server::{AppState, BoardServer};
pub use shutdown::ShutdownCoordinator;
