//! HTTP routes over the synchronization facade.

pub mod actions;
pub mod board;
pub mod buttons;
pub mod config;
pub mod errors;

use axum::Router;
use axum::routing::{get, post};

use crate::server::AppState;

pub use errors::ApiError;

/// Board, configuration, button, and action routes.
pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/board", get(board::get_board))
        .route("/api/v1/config/stage", post(config::stage))
        .route("/api/v1/config/apply", post(config::apply))
        .route("/api/v1/config/discard", post(config::discard))
        .route("/api/v1/buttons/update_content", post(buttons::update_content))
        .route("/action/{button_id}", post(actions::execute))
}
