//! # vcb-actions
//!
//! Action resolution and execution.
//!
//! - [`HandlerCatalog`]: explicit `module → function → handler` table; the
//!   only place configuration references become executable code
//! - [`ActionRegistry`]: all-or-nothing resolution of a snapshot's action
//!   definitions, and timed execution with merged parameters
//! - [`ActionHandler`]: the single async invocation contract, with
//!   [`FnHandler`] and [`AsyncFnHandler`] adapters
//! - [`builtin`]: the demonstration actions shipped with the board

#![deny(unsafe_code)]

pub mod builtin;
pub mod catalog;
pub mod errors;
pub mod handler;
pub mod registry;
pub mod result;

pub use catalog::HandlerCatalog;
pub use errors::{ExecutionError, HandlerError, ResolutionError};
pub use handler::{ActionHandler, AsyncFnHandler, FnHandler, HandlerResult};
pub use registry::{ActionRegistry, DEFAULT_ACTION_TIMEOUT};
pub use result::ActionResult;
