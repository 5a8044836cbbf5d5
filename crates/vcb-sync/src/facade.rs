//! Coordination point between the routing layer and the core registries.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use vcb_actions::{ActionResult, ExecutionError};
use vcb_core::{BoardConfig, ButtonContentUpdate, ConfigSnapshot, ConnectionId, PushMessage};

use crate::broadcast::{BroadcastManager, BroadcastReport, ConnectionHandle};
use crate::transition::{ActiveBoard, ApplyError, DiscardError, StageError, TransitionManager};

/// Failure to execute the action bound to a button.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteActionError {
    /// No button with this ID in the active configuration.
    #[error("button '{button_id}' not found")]
    ButtonNotFound {
        /// Requested button.
        button_id: String,
    },
    /// The button's action failed to run.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Result of a successful apply.
#[derive(Debug)]
pub struct ApplyOutcome {
    /// The newly active board.
    pub board: Arc<ActiveBoard>,
    /// Delivery of the navigation update.
    pub broadcast: BroadcastReport,
}

/// Translates routing-layer requests into transition and broadcast operations.
pub struct SyncFacade {
    transitions: TransitionManager,
    connections: BroadcastManager,
}

impl SyncFacade {
    /// Assemble the facade from its components.
    pub fn new(transitions: TransitionManager, connections: BroadcastManager) -> Self {
        Self {
            transitions,
            connections,
        }
    }

    /// Validate a submitted configuration and stage it.
    #[instrument(skip_all)]
    pub fn stage(&self, config: BoardConfig) -> Result<(), StageError> {
        let snapshot = ConfigSnapshot::try_from(config)?;
        self.transitions.stage(snapshot)
    }

    /// Promote the staged configuration and tell every client to re-fetch
    /// navigation.
    #[instrument(skip_all)]
    pub async fn apply(&self) -> Result<ApplyOutcome, ApplyError> {
        let board = self.transitions.apply()?;
        let broadcast = self
            .connections
            .broadcast(&PushMessage::navigation_update())
            .await;
        info!(
            generation = board.generation(),
            notified = broadcast.delivered,
            "navigation update broadcast"
        );
        Ok(ApplyOutcome { board, broadcast })
    }

    /// Drop the staged configuration.
    pub fn discard(&self) -> Result<(), DiscardError> {
        self.transitions.discard()
    }

    /// Broadcast a content update.
    ///
    /// The button ID is not checked against the active configuration.
    #[instrument(skip_all, fields(button_id = %update.button_id))]
    pub async fn push_content_update(&self, update: ButtonContentUpdate) -> BroadcastReport {
        self.connections.broadcast(&PushMessage::from(update)).await
    }

    /// Execute the action bound to a button in the active configuration.
    #[instrument(skip(self))]
    pub async fn execute_action(&self, button_id: &str) -> Result<ActionResult, ExecuteActionError> {
        let board = self.transitions.active();
        let Some((_, button)) = board.snapshot().find_button(button_id) else {
            return Err(ExecuteActionError::ButtonNotFound {
                button_id: button_id.to_owned(),
            });
        };
        let result = board
            .registry()
            .execute(&button.action_id, &button.action_params)
            .await?;
        Ok(result)
    }

    /// Attach a new push connection.
    pub async fn register_connection(&self) -> ConnectionHandle {
        self.connections.register().await
    }

    /// Detach a push connection. Idempotent.
    pub async fn unregister_connection(&self, id: &ConnectionId) -> bool {
        self.connections.unregister(id).await
    }

    /// Number of attached connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.connection_count().await
    }

    /// The active board.
    pub fn active(&self) -> Arc<ActiveBoard> {
        self.transitions.active()
    }

    /// Whether a staged configuration is waiting.
    pub fn pending_update_available(&self) -> bool {
        self.transitions.pending_update_available()
    }
}
