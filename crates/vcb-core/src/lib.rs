//! # vcb-core
//!
//! Foundation types shared by every visual control board crate.
//!
//! - **Board model**: `PageConfig`, `ButtonConfig`, `ActionDefinition` as loaded
//!   from configuration files or submitted for staging
//! - **Snapshots**: `ConfigSnapshot`, the immutable validated form of a board
//!   configuration
//! - **Push messages**: `PushMessage` wire types sent to attached clients
//! - **IDs**: `ConnectionId` newtype
//! - **Logging**: `tracing` subscriber initialization

#![deny(unsafe_code)]

pub mod board;
pub mod constants;
pub mod ids;
pub mod logging;
pub mod params;
pub mod push;
pub mod snapshot;

pub use board::{ActionDefinition, ActionsConfig, BoardConfig, ButtonConfig, PageConfig, UiConfig};
pub use ids::ConnectionId;
pub use params::{ActionParams, merge_params};
pub use push::{ButtonContentUpdate, PushMessage, Sparkline};
pub use snapshot::{ConfigSnapshot, SnapshotError};
