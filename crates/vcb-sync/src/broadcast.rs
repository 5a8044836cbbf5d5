//! Connection registry and best-effort fan-out.
//!
//! Each registered connection owns a bounded queue. A broadcast serializes
//! the message once, snapshots the connection set under a short read lock,
//! and then queues the shared payload to every connection concurrently. A
//! connection whose queue is closed, or stays full for longer than the send
//! timeout, is unregistered. No lock is held while sending.
//!
//! Unregistering releases the connection record, which wakes the transport's
//! writer so it can close the socket.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::{counter, gauge};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use vcb_core::{ConnectionId, PushMessage};

use crate::connection::ClientConnection;

/// Tunables for the connection registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Capacity of each connection's outbound queue.
    pub queue_capacity: usize,
    /// How long a broadcast waits for room in a full queue.
    pub send_timeout: Duration,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            send_timeout: Duration::from_secs(2),
        }
    }
}

/// Outcome of one broadcast.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the message was queued for.
    pub delivered: usize,
    /// Connections that failed and were unregistered.
    pub dropped: Vec<ConnectionId>,
}

/// Receiving end of a registered connection.
///
/// The transport splits it with [`ConnectionHandle::into_parts`], drains the
/// queue, and writes each payload to its client. Dropping the handle closes the queue, so the next
/// broadcast unregisters the connection even if the transport never calls
/// [`BroadcastManager::unregister`].
#[derive(Debug)]
pub struct ConnectionHandle {
    connection: Arc<ClientConnection>,
    rx: mpsc::Receiver<Arc<String>>,
}

impl ConnectionHandle {
    /// The connection's ID.
    pub fn id(&self) -> &ConnectionId {
        &self.connection.id
    }

    /// Take a queued payload without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<String>> {
        self.rx.try_recv().ok()
    }

    /// Split into the connection record and its queue receiver.
    pub fn into_parts(self) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<String>>) {
        (self.connection, self.rx)
    }
}

/// Registry of attached push connections.
pub struct BroadcastManager {
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
    config: BroadcastConfig,
}

impl BroadcastManager {
    /// Create an empty registry.
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Registry tunables.
    pub fn config(&self) -> BroadcastConfig {
        self.config
    }

    /// Create and store a new connection record.
    pub async fn register(&self) -> ConnectionHandle {
        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let connection = Arc::new(ClientConnection::new(ConnectionId::new(), tx));

        let active = {
            let mut conns = self.connections.write().await;
            let _ = conns.insert(connection.id.clone(), Arc::clone(&connection));
            conns.len()
        };

        counter!("ws_connections_total").increment(1);
        gauge!("ws_connections_active").set(active as f64);
        info!(conn_id = %connection.id, active, "connection registered");

        ConnectionHandle { connection, rx }
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        let (removed, active) = {
            let mut conns = self.connections.write().await;
            let removed = conns.remove(id);
            (removed, conns.len())
        };

        let Some(connection) = removed else {
            return false;
        };
        connection.release();
        counter!("ws_disconnections_total").increment(1);
        gauge!("ws_connections_active").set(active as f64);
        info!(conn_id = %id, active, "connection unregistered");
        true
    }

    /// Deliver a message to every registered connection.
    pub async fn broadcast(&self, message: &PushMessage) -> BroadcastReport {
        let payload = match serde_json::to_string(message) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(message_type = message.message_type(), error = %e, "failed to serialize push message");
                return BroadcastReport::default();
            }
        };
        let report = self.broadcast_raw(payload).await;
        debug!(
            message_type = message.message_type(),
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "broadcast push message"
        );
        report
    }

    /// Deliver an already serialized payload to every registered connection.
    pub async fn broadcast_raw(&self, payload: Arc<String>) -> BroadcastReport {
        let targets: Vec<Arc<ClientConnection>> =
            self.connections.read().await.values().cloned().collect();

        let timeout = self.config.send_timeout;
        let outcomes = join_all(targets.iter().map(|conn| {
            let payload = Arc::clone(&payload);
            async move { conn.send_timeout(payload, timeout).await }
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (conn, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    warn!(conn_id = %conn.id, reason = failure.as_str(), "dropping connection after failed delivery");
                    counter!("ws_broadcast_drops_total", "reason" => failure.as_str()).increment(1);
                    report.dropped.push(conn.id.clone());
                }
            }
        }

        for id in &report.dropped {
            let _ = self.unregister(id).await;
        }
        report
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for BroadcastManager {
    fn default() -> Self {
        Self::new(BroadcastConfig::default())
    }
}
