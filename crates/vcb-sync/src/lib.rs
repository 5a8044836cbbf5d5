//! # vcb-sync
//!
//! Live synchronization and configuration transitions for the control board.
//!
//! - [`TransitionManager`]: active board plus staging slot; stage, apply,
//!   and discard with validation
//! - [`BroadcastManager`]: registry of attached push connections with
//!   best-effort, per-connection-isolated fan-out
//! - [`SyncFacade`]: the single entry point the routing layer talks to

#![deny(unsafe_code)]

pub mod broadcast;
pub mod connection;
pub mod facade;
pub mod transition;

pub use broadcast::{BroadcastConfig, BroadcastManager, BroadcastReport, ConnectionHandle};
pub use connection::{ClientConnection, DeliveryFailure};
pub use facade::{ApplyOutcome, ExecuteActionError, SyncFacade};
pub use transition::{
    ActiveBoard, ApplyError, DiscardError, StageError, TransitionManager, TransitionState,
};
