//! `BoardServer`: Axum HTTP + WebSocket server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use vcb_sync::SyncFacade;

use crate::api;
use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session::{SessionConfig, run_ws_session};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Transitions, broadcasts, and action execution.
    pub facade: Arc<SyncFacade>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
    /// WebSocket session timing.
    pub session: SessionConfig,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

/// The control board server.
pub struct BoardServer {
    config: ServerConfig,
    facade: Arc<SyncFacade>,
    shutdown: Arc<ShutdownCoordinator>,
    metrics: Option<PrometheusHandle>,
    start_time: Instant,
}

impl BoardServer {
    /// Create a new server around a facade.
    pub fn new(config: ServerConfig, facade: SyncFacade) -> Self {
        Self {
            config,
            facade: Arc::new(facade),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            metrics: None,
            start_time: Instant::now(),
        }
    }

    /// Serve `/metrics` from this handle.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            facade: Arc::clone(&self.facade),
            shutdown: Arc::clone(&self.shutdown),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
            session: SessionConfig::from(&self.config),
            max_message_size: self.config.max_message_size,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws/button_updates", get(ws_handler))
            .merge(api::routes())
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns the bound address (useful with port `0`) and the serving task,
    /// which finishes after [`ShutdownCoordinator::shutdown`].
    pub async fn listen(&self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(error = %e, "server error");
            }
        });

        info!(%addr, "board server listening");
        Ok((addr, handle))
    }

    /// Get the facade.
    pub fn facade(&self) -> &Arc<SyncFacade> {
        &self.facade
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.facade.connection_count().await;
    Json(health::health_check(
        state.start_time,
        connections,
        state.facade.active().generation(),
        state.facade.pending_update_available(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            crate::metrics::render(handle),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// GET /ws/button_updates
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.max_message_size(state.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    if state.shutdown.is_shutting_down() {
        return;
    }
    let handle = state.facade.register_connection().await;
    let session = run_ws_session(
        socket,
        handle,
        state.facade,
        state.session,
        state.shutdown.token(),
    );
    state.shutdown.track_session(session).await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use vcb_actions::{HandlerCatalog, HandlerError};
    use vcb_core::{BoardConfig, ConfigSnapshot};
    use vcb_sync::{BroadcastManager, TransitionManager};

    fn board(button_action: &str) -> Value {
        json!({
            "ui_config": {"pages": [{"name": "Main", "id": "main", "buttons": [
                {"id": "b1", "text": "Greet", "action_id": button_action,
                 "action_params": {"name": "Ada"}},
                {"id": "b2", "text": "Broken", "action_id": "fail"},
                {"id": "b3", "text": "Soft", "action_id": "soft_fail"}
            ]}]},
            "actions_config": {"actions": [
                {"id": "greet", "module": "builtin", "function": "greet_user_action"},
                {"id": "another", "module": "builtin", "function": "another_action"},
                {"id": "fail", "module": "test", "function": "fail"},
                {"id": "soft_fail", "module": "test", "function": "soft_fail"}
            ]}
        })
    }

    fn make_server() -> BoardServer {
        let mut catalog = HandlerCatalog::with_builtins();
        catalog.register_fn("test", "fail", |_| Err(HandlerError::msg("kaboom")));
        catalog.register_fn("test", "soft_fail", |_| {
            Ok(json!({"status": "error", "message": "disk full"}))
        });
        let initial: BoardConfig = serde_json::from_value(board("greet")).unwrap();
        let transitions = TransitionManager::new(
            Arc::new(catalog),
            ConfigSnapshot::try_from(initial).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        let facade = SyncFacade::new(transitions, BroadcastManager::default());
        BoardServer::new(ServerConfig::default(), facade)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, body) = call_raw(app, method, uri, body).await;
        (status, body)
    }

    async fn call_raw(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let req = match body {
            Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        let parsed = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, parsed)
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server().router();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["generation"], 0);
        assert_eq!(body["pending_update_available"], false);
    }

    #[tokio::test]
    async fn board_lists_active_pages() {
        let app = make_server().router();
        let (status, body) = call(&app, "GET", "/api/v1/board", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 0);
        assert_eq!(body["pages"][0]["id"], "main");
        assert_eq!(body["pages"][0]["buttons"][0]["id"], "b1");
    }

    #[tokio::test]
    async fn stage_then_apply() {
        let server = make_server();
        let app = server.router();

        let (status, body) = call(&app, "POST", "/api/v1/config/stage", Some(board("another"))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["pending_update_available"], true);

        let (_, board_view) = call(&app, "GET", "/api/v1/board", None).await;
        assert_eq!(board_view["pending_update_available"], true);
        assert_eq!(board_view["generation"], 0);

        let (status, headers, body) = call_raw(&app, "POST", "/api/v1/config/apply", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["hx-refresh"], "true");
        assert_eq!(
            body["message"],
            "Configuration applied successfully. Page will refresh."
        );
        assert_eq!(body["generation"], 1);
        assert!(!server.facade().pending_update_available());

        let (_, body) = call(&app, "POST", "/action/b1", None).await;
        assert_eq!(body["message"], "The 'another_action' was performed successfully!");
    }

    #[tokio::test]
    async fn stage_malformed_json_is_invalid_config() {
        let app = make_server().router();
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/config/stage")
            .header("content-type", "application/json")
            .body(Body::from("{ nope"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_CONFIG");
    }

    #[tokio::test]
    async fn stage_accepts_nulls_and_repeated_button_ids() {
        let app = make_server().router();
        let cfg = json!({
            "ui_config": {"pages": [
                {"name": "Main", "id": "main", "grid_columns": null, "buttons": [
                    {"id": "home", "text": "Home", "action_id": "greet", "action_params": null}
                ]},
                {"name": "More", "id": "more", "buttons": [
                    {"id": "home", "text": "Home", "action_id": "greet"}
                ]}
            ]},
            "actions_config": {"actions": [
                {"id": "greet", "module": "builtin", "function": "greet_user_action"}
            ]}
        });
        let (status, body) = call(&app, "POST", "/api/v1/config/stage", Some(cfg)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["pending_update_available"], true);

        let (status, _) = call(&app, "POST", "/api/v1/config/apply", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, board_view) = call(&app, "GET", "/api/v1/board", None).await;
        assert_eq!(board_view["pages"][0]["grid_columns"], 3);

        let (status, body) = call(&app, "POST", "/action/home", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Hello, User! This greeting action was successfully triggered."
        );
    }

    #[tokio::test]
    async fn stage_unknown_button_action_is_invalid_config() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/api/v1/config/stage", Some(board("ghost"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_CONFIG");
    }

    #[tokio::test]
    async fn stage_unresolvable_handler_is_rejected() {
        let server = make_server();
        let app = server.router();
        let mut cfg = board("greet");
        cfg["actions_config"]["actions"][0]["function"] = json!("no_such_function");

        let (status, body) = call(&app, "POST", "/api/v1/config/stage", Some(cfg)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "ACTION_RESOLUTION_FAILED");
        assert_eq!(body["error"]["details"]["action_id"], "greet");
        assert!(!server.facade().pending_update_available());
    }

    #[tokio::test]
    async fn apply_and_discard_without_staging() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/api/v1/config/apply", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOTHING_STAGED");

        let (status, body) = call(&app, "POST", "/api/v1/config/discard", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOTHING_STAGED");
    }

    #[tokio::test]
    async fn discard_clears_staged() {
        let server = make_server();
        let app = server.router();
        let _ = call(&app, "POST", "/api/v1/config/stage", Some(board("another"))).await;

        let (status, body) = call(&app, "POST", "/api/v1/config/discard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pending_update_available"], false);
        assert_eq!(server.facade().active().generation(), 0);
    }

    #[tokio::test]
    async fn update_content_accepts_unknown_buttons() {
        let server = make_server();
        let app = server.router();
        let mut client = server.facade().register_connection().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/buttons/update_content",
            Some(json!({"button_id": "not_on_board", "text": "42"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["button_id"], "not_on_board");

        let pushed: Value = serde_json::from_str(&client.try_recv().unwrap()).unwrap();
        assert_eq!(pushed["type"], "button_content_update");
        assert_eq!(pushed["payload"]["text"], "42");
    }

    #[tokio::test]
    async fn update_content_malformed_is_unprocessable() {
        let app = make_server().router();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/buttons/update_content",
            Some(json!({"text": "no button id"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn action_runs_button_handler() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/action/b1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(
            body["message"],
            "Hello, Ada! This greeting action was successfully triggered."
        );
        assert!(body["result"].is_object());
    }

    #[tokio::test]
    async fn action_unknown_button() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/action/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "BUTTON_NOT_FOUND");
        assert_eq!(
            body["error"]["message"],
            "Configuration error: Button ID 'nope' not found."
        );
    }

    #[tokio::test]
    async fn action_handler_failure() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/action/b2", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "ACTION_FAILED");
        assert!(body["error"]["message"].as_str().unwrap().contains("kaboom"));
    }

    #[tokio::test]
    async fn action_reporting_error_status_fails() {
        let app = make_server().router();
        let (status, body) = call(&app, "POST", "/action/b3", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "ACTION_FAILED");
        assert_eq!(body["error"]["message"], "disk full");
        assert_eq!(body["error"]["details"]["action_id"], "soft_fail");
        assert_eq!(body["error"]["details"]["result"]["status"], "error");
    }

    #[tokio::test]
    async fn metrics_without_recorder() {
        let app = make_server().router();
        let (status, _) = call(&app, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_with_recorder_handle() {
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let app = make_server().with_metrics(handle).router();
        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = make_server().router();
        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_binds_and_shuts_down() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            ..ServerConfig::default()
        };
        let server = BoardServer::new(config, make_server_facade());
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        assert!(
            server
                .shutdown()
                .graceful_shutdown(handle, Some(Duration::from_secs(5)))
                .await
        );
    }

    fn make_server_facade() -> SyncFacade {
        let transitions = TransitionManager::new(
            Arc::new(HandlerCatalog::with_builtins()),
            ConfigSnapshot::try_from(BoardConfig::default()).unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        SyncFacade::new(transitions, BroadcastManager::default())
    }
}
