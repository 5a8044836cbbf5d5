//! WebSocket session lifecycle: a single attached client from upgrade
//! through disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::histogram;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use vcb_core::ConnectionId;
use vcb_sync::{ConnectionHandle, SyncFacade};

use super::heartbeat::{HeartbeatResult, run_heartbeat};
use crate::config::ServerConfig;

/// How long the writer gets to flush a close frame on the way out.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Per-session timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Ping cadence and liveness check interval.
    pub heartbeat_interval: Duration,
    /// Silence tolerated before the client is dropped.
    pub heartbeat_timeout: Duration,
}

impl From<&ServerConfig> for SessionConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            heartbeat_interval: config.heartbeat_interval(),
            heartbeat_timeout: config.heartbeat_timeout(),
        }
    }
}

/// First frame sent to every client.
pub fn established_message(conn_id: &ConnectionId) -> Value {
    json!({
        "type": "connection.established",
        "payload": { "connection_id": conn_id },
    })
}

/// Run a push session for an already registered connection.
///
/// Queued broadcasts are written to the socket in order. Inbound frames only
/// count as activity; their content is ignored. The session ends when the
/// client closes, the heartbeat gives up, the connection is dropped from the
/// registry, or `shutdown` fires. The connection is unregistered on exit.
#[instrument(skip_all, fields(conn_id = %handle.id()))]
pub async fn run_ws_session(
    ws: WebSocket,
    handle: ConnectionHandle,
    facade: Arc<SyncFacade>,
    config: SessionConfig,
    shutdown: CancellationToken,
) {
    let started = Instant::now();
    let (connection, mut queue) = handle.into_parts();
    let conn_id = connection.id.clone();
    let (mut ws_tx, mut ws_rx) = ws.split();
    let session = shutdown.child_token();
    info!("client connected");

    if let Ok(text) = serde_json::to_string(&established_message(&conn_id)) {
        let _ = ws_tx.send(Message::Text(text.into())).await;
    }

    let heartbeat = {
        let connection = Arc::clone(&connection);
        let session = session.clone();
        tokio::spawn(async move {
            let result = run_heartbeat(
                connection,
                config.heartbeat_interval,
                config.heartbeat_timeout,
                session.clone(),
            )
            .await;
            if result == HeartbeatResult::TimedOut {
                warn!(timeout = ?config.heartbeat_timeout, "client unresponsive, disconnecting");
                session.cancel();
            }
        })
    };

    let mut outbound = {
        let connection = Arc::clone(&connection);
        let session = session.clone();
        tokio::spawn(async move {
            let mut ping = tokio::time::interval(config.heartbeat_interval);
            let _ = ping.tick().await;

            loop {
                tokio::select! {
                    msg = queue.recv() => {
                        let Some(payload) = msg else { break };
                        if ws_tx.send(Message::Text(String::clone(&payload).into())).await.is_err() {
                            break;
                        }
                    }
                    _ = ping.tick() => {
                        if ws_tx.send(Message::Ping(Vec::<u8>::new().into())).await.is_err() {
                            break;
                        }
                    }
                    () = connection.released() => {
                        debug!("connection no longer registered, closing");
                        break;
                    }
                    () = session.cancelled() => break,
                }
            }
            let _ = ws_tx.send(Message::Close(None)).await;
            session.cancel();
        })
    };

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("client closed the socket");
                    break;
                }
                Some(Ok(msg)) => {
                    connection.mark_alive();
                    if let Message::Text(text) = msg {
                        debug!(len = text.as_str().len(), "ignoring inbound text frame");
                    }
                }
                Some(Err(e)) => {
                    debug!(error = %e, "websocket receive error");
                    break;
                }
            },
            () = session.cancelled() => break,
        }
    }

    session.cancel();
    if tokio::time::timeout(CLOSE_GRACE, &mut outbound).await.is_err() {
        outbound.abort();
    }
    let _ = heartbeat.await;
    if !connection.is_released() {
        let _ = facade.unregister_connection(&conn_id).await;
    }

    histogram!("ws_connection_duration_seconds").record(started.elapsed().as_secs_f64());
    info!(
        duration_secs = started.elapsed().as_secs(),
        dropped = connection.drop_count(),
        "client disconnected"
    );
}
