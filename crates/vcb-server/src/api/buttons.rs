//! Live button content pushes.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::debug;
use vcb_core::ButtonContentUpdate;

use super::errors::{ApiError, INVALID_PAYLOAD};
use crate::server::AppState;

/// POST /api/v1/buttons/update_content
///
/// The button ID is not checked against the active configuration; clients
/// ignore updates for buttons they do not render.
pub async fn update_content(
    State(state): State<AppState>,
    payload: Result<Json<ButtonContentUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = payload.map_err(|rejection| {
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            INVALID_PAYLOAD,
            rejection.body_text(),
        )
    })?;
    let button_id = update.button_id.clone();

    let report = state.facade.push_content_update(update).await;
    debug!(
        button_id,
        delivered = report.delivered,
        dropped = report.dropped.len(),
        "content update pushed"
    );

    Ok(Json(json!({
        "message": "Button content update broadcasted.",
        "button_id": button_id,
    })))
}
