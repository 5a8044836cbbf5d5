//! Resolved action registry and timed execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{debug, error, info, warn};
use vcb_core::{ActionDefinition, ActionParams, ConfigSnapshot, merge_params};

use crate::catalog::HandlerCatalog;
use crate::errors::{ExecutionError, ResolutionError};
use crate::handler::ActionHandler;
use crate::result::ActionResult;

/// Default upper bound on a single handler invocation.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Executions slower than this are logged at warn level.
const SLOW_ACTION_THRESHOLD: Duration = Duration::from_secs(5);

struct ResolvedAction {
    definition: ActionDefinition,
    handler: Arc<dyn ActionHandler>,
}

/// Mapping from action ID to a resolved, invocable handler.
///
/// Built all-or-nothing from a set of definitions and never mutated
/// afterwards. A new configuration gets a new registry.
pub struct ActionRegistry {
    actions: HashMap<String, ResolvedAction>,
    timeout: Duration,
}

impl ActionRegistry {
    /// Resolve every definition against the catalog.
    ///
    /// Returns the first failure; no partial registry is produced.
    pub fn resolve_all<'a>(
        catalog: &HandlerCatalog,
        definitions: impl IntoIterator<Item = &'a ActionDefinition>,
        timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        let mut actions = HashMap::new();
        for def in definitions {
            let handler = catalog.resolve(def)?;
            debug!(action_id = %def.id, module = %def.module, function = %def.function, "resolved action");
            let _ = actions.insert(
                def.id.clone(),
                ResolvedAction {
                    definition: def.clone(),
                    handler,
                },
            );
        }
        Ok(Self { actions, timeout })
    }

    /// Resolve every action declared by a snapshot.
    pub fn for_snapshot(
        catalog: &HandlerCatalog,
        snapshot: &ConfigSnapshot,
        timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        Self::resolve_all(catalog, snapshot.actions().values(), timeout)
    }

    /// Execute an action with `params` merged over its default parameters.
    pub async fn execute(
        &self,
        action_id: &str,
        params: &ActionParams,
    ) -> Result<ActionResult, ExecutionError> {
        counter!("action_executions_total", "action_id" => action_id.to_owned()).increment(1);

        let Some(action) = self.actions.get(action_id) else {
            counter!("action_errors_total", "action_id" => action_id.to_owned(), "error_type" => "not_found").increment(1);
            warn!(action_id, "action not found in registry");
            return Err(ExecutionError::NotFound {
                action_id: action_id.to_owned(),
            });
        };

        let merged = merge_params(&action.definition.default_params, params);
        info!(action_id, params = ?merged, "executing action");

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, action.handler.call(merged)).await;
        let duration = start.elapsed();
        histogram!("action_duration_seconds", "action_id" => action_id.to_owned())
            .record(duration.as_secs_f64());

        let result = match outcome {
            Ok(Ok(value)) => Ok(ActionResult {
                action_id: action_id.to_owned(),
                value,
                duration,
            }),
            Ok(Err(err)) => {
                error!(action_id, error = %err, "action failed");
                Err(ExecutionError::Failed {
                    action_id: action_id.to_owned(),
                    message: err.to_string(),
                })
            }
            Err(_elapsed) => {
                error!(action_id, "action timed out after {:?}", self.timeout);
                Err(ExecutionError::TimedOut {
                    action_id: action_id.to_owned(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        };

        if let Err(err) = &result {
            counter!("action_errors_total", "action_id" => action_id.to_owned(), "error_type" => err.kind()).increment(1);
        }
        if duration >= SLOW_ACTION_THRESHOLD {
            warn!(action_id, duration_secs = duration.as_secs_f64(), "slow action");
        }

        result
    }

    /// Whether an action ID is registered.
    pub fn has_action(&self, action_id: &str) -> bool {
        self.actions.contains_key(action_id)
    }

    /// Registered action IDs (sorted).
    pub fn action_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.actions.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.action_ids())
            .field("timeout", &self.timeout)
            .finish()
    }
}
