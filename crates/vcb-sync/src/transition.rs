//! Two-phase configuration transitions.
//!
//! The manager owns two tracks:
//!
//! - the **active** board: a snapshot paired with the registry resolved from
//!   it, published as one `Arc<ActiveBoard>` so readers can never see a
//!   snapshot next to another snapshot's registry
//! - the **staging slot**: at most one validated candidate awaiting apply or
//!   discard
//!
//! ```text
//!              stage (ok)               apply (ok)
//!   NoStaged ─────────────▶ Staged ─────────────────▶ NoStaged
//!       ▲                   │  ▲ │                     (active replaced,
//!       │      discard      │  │ │ stage (ok):          generation + 1)
//!       └───────────────────┘  └─┘ replace candidate
//! ```
//!
//! Stage, apply, and discard serialize on the staging slot lock. Readers of
//! the active board only take a brief read lock to clone the `Arc`.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{info, warn};
use vcb_actions::{ActionRegistry, HandlerCatalog, ResolutionError};
use vcb_core::{ConfigSnapshot, SnapshotError};

/// The active snapshot together with the registry resolved from it.
#[derive(Debug)]
pub struct ActiveBoard {
    snapshot: Arc<ConfigSnapshot>,
    registry: Arc<ActionRegistry>,
    generation: u64,
}

impl ActiveBoard {
    fn new(snapshot: Arc<ConfigSnapshot>, registry: ActionRegistry, generation: u64) -> Self {
        debug_assert!(
            snapshot
                .ui()
                .buttons()
                .all(|button| registry.has_action(&button.action_id)),
            "registry does not cover every button of its snapshot"
        );
        Self {
            snapshot,
            registry: Arc::new(registry),
            generation,
        }
    }

    /// The active configuration.
    pub fn snapshot(&self) -> &Arc<ConfigSnapshot> {
        &self.snapshot
    }

    /// The registry resolved from [`ActiveBoard::snapshot`].
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Number of successful applies since startup.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a candidate is waiting in the staging slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    /// The staging slot is empty.
    NoStaged,
    /// A validated candidate is waiting.
    Staged,
}

/// Rejected stage request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The submitted configuration is structurally invalid.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SnapshotError),
    /// An action in the candidate cannot be resolved.
    #[error("action resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Rejected apply request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// Nothing has been staged.
    #[error("no staged configuration to apply")]
    NothingStaged,
    /// The staged candidate no longer resolves.
    #[error("action resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
}

/// Rejected discard request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscardError {
    /// Nothing has been staged.
    #[error("no staged configuration to discard")]
    NothingStaged,
}

/// Holds the active board and the staging slot.
#[derive(Debug)]
pub struct TransitionManager {
    catalog: Arc<HandlerCatalog>,
    action_timeout: Duration,
    active: RwLock<Arc<ActiveBoard>>,
    staged: Mutex<Option<Arc<ConfigSnapshot>>>,
}

impl TransitionManager {
    /// Resolve the initial snapshot and make it active (generation 0).
    pub fn new(
        catalog: Arc<HandlerCatalog>,
        initial: ConfigSnapshot,
        action_timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        let registry = ActionRegistry::for_snapshot(&catalog, &initial, action_timeout)?;
        info!(
            pages = initial.pages().len(),
            actions = initial.actions().len(),
            "initial board configuration active"
        );
        gauge!("config_generation").set(0.0);
        Ok(Self {
            catalog,
            action_timeout,
            active: RwLock::new(Arc::new(ActiveBoard::new(Arc::new(initial), registry, 0))),
            staged: Mutex::new(None),
        })
    }

    /// Validate a candidate and place it in the staging slot.
    ///
    /// A previously staged candidate is replaced. On error the slot and the
    /// active board are unchanged.
    pub fn stage(&self, candidate: ConfigSnapshot) -> Result<(), StageError> {
        let mut slot = self.staged.lock();
        if let Err(err) = self.resolve(&candidate) {
            warn!(action_id = err.action_id(), error = %err, "rejected staged configuration");
            counter!("config_transitions_total", "operation" => "stage", "outcome" => "rejected").increment(1);
            return Err(err.into());
        }
        let replaced = slot.replace(Arc::new(candidate)).is_some();
        counter!("config_transitions_total", "operation" => "stage", "outcome" => "ok").increment(1);
        info!(replaced, "configuration staged");
        Ok(())
    }

    /// Promote the staged candidate to active.
    ///
    /// The candidate is re-resolved first; if that fails, both the slot and
    /// the active board are left as they were.
    pub fn apply(&self) -> Result<Arc<ActiveBoard>, ApplyError> {
        let mut slot = self.staged.lock();
        let Some(candidate) = slot.as_ref() else {
            return Err(ApplyError::NothingStaged);
        };

        let registry = match self.resolve(candidate) {
            Ok(registry) => registry,
            Err(err) => {
                warn!(action_id = err.action_id(), error = %err, "staged configuration no longer resolves");
                counter!("config_transitions_total", "operation" => "apply", "outcome" => "rejected").increment(1);
                return Err(err.into());
            }
        };

        let next = {
            let mut active = self.active.write();
            let next = Arc::new(ActiveBoard::new(
                Arc::clone(candidate),
                registry,
                active.generation + 1,
            ));
            *active = Arc::clone(&next);
            next
        };
        *slot = None;

        gauge!("config_generation").set(next.generation as f64);
        counter!("config_transitions_total", "operation" => "apply", "outcome" => "ok").increment(1);
        info!(
            generation = next.generation,
            actions = next.snapshot.actions().len(),
            "staged configuration applied"
        );
        Ok(next)
    }

    /// Drop the staged candidate.
    pub fn discard(&self) -> Result<(), DiscardError> {
        let mut slot = self.staged.lock();
        if slot.take().is_none() {
            return Err(DiscardError::NothingStaged);
        }
        counter!("config_transitions_total", "operation" => "discard", "outcome" => "ok").increment(1);
        info!("staged configuration discarded");
        Ok(())
    }

    /// The active board.
    pub fn active(&self) -> Arc<ActiveBoard> {
        Arc::clone(&self.active.read())
    }

    /// Current state of the staging slot.
    pub fn state(&self) -> TransitionState {
        if self.staged.lock().is_some() {
            TransitionState::Staged
        } else {
            TransitionState::NoStaged
        }
    }

    /// Whether a candidate is waiting to be applied.
    pub fn pending_update_available(&self) -> bool {
        self.state() == TransitionState::Staged
    }

    fn resolve(&self, snapshot: &ConfigSnapshot) -> Result<ActionRegistry, ResolutionError> {
        ActionRegistry::for_snapshot(&self.catalog, snapshot, self.action_timeout)
    }
}
