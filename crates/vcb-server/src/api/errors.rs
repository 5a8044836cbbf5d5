//! HTTP error codes and the routing-layer error type.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use vcb_actions::ExecutionError;
use vcb_sync::{ApplyError, DiscardError, ExecuteActionError, StageError};

// ── Error code constants ────────────────────────────────────────────

/// Submitted configuration is malformed or structurally invalid.
pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
/// An action definition names a handler the catalog does not have.
pub const ACTION_RESOLUTION_FAILED: &str = "ACTION_RESOLUTION_FAILED";
/// Apply or discard with an empty staging slot.
pub const NOTHING_STAGED: &str = "NOTHING_STAGED";
/// No button with the requested ID in the active configuration.
pub const BUTTON_NOT_FOUND: &str = "BUTTON_NOT_FOUND";
/// The button's action is missing from the active registry.
pub const ACTION_NOT_FOUND: &str = "ACTION_NOT_FOUND";
/// The handler reported a failure.
pub const ACTION_FAILED: &str = "ACTION_FAILED";
/// The handler did not finish in time.
pub const ACTION_TIMEOUT: &str = "ACTION_TIMEOUT";
/// Request body could not be parsed.
pub const INVALID_PAYLOAD: &str = "INVALID_PAYLOAD";

/// Wire-format error body, nested under `"error"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    /// Build an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convert to the wire-format error body.
    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code.to_owned(),
            message: self.message.clone(),
            details: self.details.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_error_body() });
        (self.status, Json(body)).into_response()
    }
}

impl From<StageError> for ApiError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Invalid(inner) => {
                Self::new(StatusCode::BAD_REQUEST, INVALID_CONFIG, inner.to_string())
            }
            StageError::Resolution(inner) => Self::new(
                StatusCode::BAD_REQUEST,
                ACTION_RESOLUTION_FAILED,
                inner.to_string(),
            )
            .with_details(json!({ "action_id": inner.action_id() })),
        }
    }
}

impl From<ApplyError> for ApiError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::NothingStaged => Self::new(
                StatusCode::NOT_FOUND,
                NOTHING_STAGED,
                "No staged configuration found to apply.",
            ),
            ApplyError::Resolution(inner) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ACTION_RESOLUTION_FAILED,
                inner.to_string(),
            )
            .with_details(json!({ "action_id": inner.action_id() })),
        }
    }
}

impl From<DiscardError> for ApiError {
    fn from(err: DiscardError) -> Self {
        match err {
            DiscardError::NothingStaged => Self::new(
                StatusCode::NOT_FOUND,
                NOTHING_STAGED,
                "No staged configuration found to discard.",
            ),
        }
    }
}

impl From<ExecuteActionError> for ApiError {
    fn from(err: ExecuteActionError) -> Self {
        match err {
            ExecuteActionError::ButtonNotFound { button_id } => Self::new(
                StatusCode::NOT_FOUND,
                BUTTON_NOT_FOUND,
                format!("Configuration error: Button ID '{button_id}' not found."),
            ),
            ExecuteActionError::Execution(inner) => Self::from(inner),
        }
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        let (status, code) = match &err {
            ExecutionError::NotFound { .. } => (StatusCode::NOT_FOUND, ACTION_NOT_FOUND),
            ExecutionError::Failed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, ACTION_FAILED),
            ExecutionError::TimedOut { .. } => (StatusCode::GATEWAY_TIMEOUT, ACTION_TIMEOUT),
        };
        Self::new(status, code, err.to_string())
    }
}
