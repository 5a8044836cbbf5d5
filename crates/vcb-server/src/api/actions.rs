//! Button press route.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::errors::{ACTION_FAILED, ApiError};
use crate::server::AppState;

/// `POST /action/{button_id}` response.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// Status reported by the handler (`"success"` unless it says otherwise).
    pub status: String,
    /// Feedback shown to the user.
    pub message: String,
    /// Raw handler return value.
    pub result: Value,
}

/// POST /action/{button_id}
///
/// A handler that returns an error-shaped value is answered like one that
/// failed outright.
pub async fn execute(
    State(state): State<AppState>,
    Path(button_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let result = state
        .facade
        .execute_action(&button_id)
        .await
        .inspect_err(|err| warn!(button_id, error = %err, "button action failed"))?;

    if let Some(message) = result.reported_error() {
        warn!(button_id, action_id = %result.action_id, %message, "action reported an error");
        let details = json!({"action_id": result.action_id, "result": result.value});
        return Err(
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ACTION_FAILED, message)
                .with_details(details),
        );
    }

    let message = result
        .message()
        .map_or_else(|| format!("Action '{}' completed.", result.action_id), str::to_owned);
    let status = result.status().to_owned();
    info!(
        button_id,
        action_id = %result.action_id,
        duration_ms = result.duration.as_millis(),
        "button action executed"
    );

    Ok(Json(ActionResponse {
        status,
        message,
        result: result.into_value(),
    }))
}
