//! Action resolution and execution errors.

use thiserror::Error;

/// A handler could not be produced for an action definition.
///
/// Resolution is all-or-nothing: the first failure aborts the whole build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The referenced module is not present in the catalog.
    #[error("action '{action_id}': module '{module}' not found")]
    UnitNotFound {
        /// Action whose definition failed.
        action_id: String,
        /// Missing module.
        module: String,
    },

    /// The module exists but has no handler with the referenced name.
    #[error("action '{action_id}': '{module}.{function}' is not a registered handler")]
    NotCallable {
        /// Action whose definition failed.
        action_id: String,
        /// Module that was found.
        module: String,
        /// Missing function.
        function: String,
    },
}

impl ResolutionError {
    /// Identifier of the action that failed to resolve.
    pub fn action_id(&self) -> &str {
        match self {
            Self::UnitNotFound { action_id, .. } | Self::NotCallable { action_id, .. } => {
                action_id
            }
        }
    }
}

/// Failure reported by a handler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// A parameter had the wrong type or value.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Any other handler failure.
    #[error("{0}")]
    Message(String),
}

impl HandlerError {
    /// Build a free-form failure.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Build an invalid-parameter failure.
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to execute an action through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// No action with this ID in the registry.
    #[error("action '{action_id}' not found")]
    NotFound {
        /// Requested action.
        action_id: String,
    },

    /// The handler returned an error or panicked.
    #[error("action '{action_id}' failed: {message}")]
    Failed {
        /// Executed action.
        action_id: String,
        /// The handler's failure message.
        message: String,
    },

    /// The handler did not complete within the registry timeout.
    #[error("action '{action_id}' timed out after {timeout_ms}ms")]
    TimedOut {
        /// Executed action.
        action_id: String,
        /// Timeout that expired.
        timeout_ms: u64,
    },
}

impl ExecutionError {
    /// Short label used for the `error_type` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_not_found_display() {
        let err = ResolutionError::UnitNotFound {
            action_id: "a1".into(),
            module: "ghost".into(),
        };
        assert_eq!(err.to_string(), "action 'a1': module 'ghost' not found");
        assert_eq!(err.action_id(), "a1");
    }

    #[test]
    fn not_callable_display() {
        let err = ResolutionError::NotCallable {
            action_id: "a2".into(),
            module: "builtin".into(),
            function: "nope".into(),
        };
        assert!(err.to_string().contains("builtin.nope"));
        assert_eq!(err.action_id(), "a2");
    }

    #[test]
    fn handler_error_messages() {
        assert_eq!(HandlerError::msg("disk full").to_string(), "disk full");
        assert_eq!(
            HandlerError::invalid_param("name", "expected a string").to_string(),
            "invalid parameter 'name': expected a string"
        );
    }

    #[test]
    fn execution_error_kinds() {
        assert_eq!(
            ExecutionError::NotFound { action_id: "x".into() }.kind(),
            "not_found"
        );
        assert_eq!(
            ExecutionError::TimedOut {
                action_id: "x".into(),
                timeout_ms: 10
            }
            .kind(),
            "timeout"
        );
    }

    #[test]
    fn failed_carries_handler_message() {
        let err = ExecutionError::Failed {
            action_id: "greet".into(),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "action 'greet' failed: boom");
    }
}
