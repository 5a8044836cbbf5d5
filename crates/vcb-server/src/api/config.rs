//! Stage, apply, and discard routes.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::info;
use vcb_core::BoardConfig;

use super::errors::{ApiError, INVALID_CONFIG};
use crate::server::AppState;

/// Header telling htmx clients to reload the page.
pub const HX_REFRESH: &str = "HX-Refresh";

/// POST /api/v1/config/stage
pub async fn stage(
    State(state): State<AppState>,
    payload: Result<Json<BoardConfig>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(config) = payload.map_err(|rejection| {
        ApiError::new(StatusCode::BAD_REQUEST, INVALID_CONFIG, rejection.body_text())
    })?;
    let pages = config.ui_config.pages.len();
    let actions = config.actions_config.actions.len();

    state.facade.stage(config)?;
    info!(pages, actions, "configuration staged");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Configuration staged. Apply it to make it active.",
            "pending_update_available": true,
        })),
    ))
}

/// POST /api/v1/config/apply
pub async fn apply(
    State(state): State<AppState>,
) -> Result<([(&'static str, &'static str); 1], Json<Value>), ApiError> {
    let outcome = state.facade.apply().await?;
    Ok((
        [(HX_REFRESH, "true")],
        Json(json!({
            "message": "Configuration applied successfully. Page will refresh.",
            "generation": outcome.board.generation(),
            "notified": outcome.broadcast.delivered,
        })),
    ))
}

/// POST /api/v1/config/discard
pub async fn discard(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.facade.discard()?;
    Ok(Json(json!({
        "message": "Staged configuration discarded.",
        "pending_update_available": false,
    })))
}
