//! Read-only view of the active board.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use vcb_core::PageConfig;

use crate::server::AppState;

/// `GET /api/v1/board` response.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// Generation of the active configuration.
    pub generation: u64,
    /// Pages in navigation order.
    pub pages: Vec<PageConfig>,
    /// Whether a staged configuration is waiting.
    pub pending_update_available: bool,
}

/// GET /api/v1/board
pub async fn get_board(State(state): State<AppState>) -> Json<BoardResponse> {
    let board = state.facade.active();
    Json(BoardResponse {
        generation: board.generation(),
        pages: board.snapshot().pages().to_vec(),
        pending_update_available: state.facade.pending_update_available(),
    })
}
