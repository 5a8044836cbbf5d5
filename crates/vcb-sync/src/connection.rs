//! State of one attached push connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use vcb_core::ConnectionId;

/// Why a message could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The receiving side is gone.
    Closed,
    /// The queue stayed full for the whole send timeout.
    TimedOut,
}

impl DeliveryFailure {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::TimedOut => "timeout",
        }
    }
}

/// A registered connection's outbound queue plus liveness bookkeeping.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    tx: mpsc::Sender<Arc<String>>,
    connected_at: Instant,
    /// Set by any inbound frame, cleared by each liveness check.
    is_alive: AtomicBool,
    /// Fired once the registry forgets this connection.
    released: CancellationToken,
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a connection record around a queue sender.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            connected_at: Instant::now(),
            is_alive: AtomicBool::new(true),
            released: CancellationToken::new(),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Queue a message, waiting up to `timeout` for room.
    pub async fn send_timeout(
        &self,
        message: Arc<String>,
        timeout: Duration,
    ) -> Result<(), DeliveryFailure> {
        let result = match self.tx.send_timeout(message, timeout).await {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendTimeoutError::Closed(_)) => Err(DeliveryFailure::Closed),
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => Err(DeliveryFailure::TimedOut),
        };
        if result.is_err() {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Total messages that could not be queued.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Record client activity (pong or any inbound frame).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
    }

    /// Check and reset the alive flag.
    ///
    /// Returns `true` if the client was active since the previous check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Mark the connection as removed from the registry.
    pub(crate) fn release(&self) {
        self.released.cancel();
    }

    /// Whether the registry has let go of this connection.
    pub fn is_released(&self) -> bool {
        self.released.is_cancelled()
    }

    /// Resolves once the registry lets go of this connection, either through
    /// an explicit unregister or after a failed delivery.
    pub fn released(&self) -> WaitForCancellationFuture<'_> {
        self.released.cancelled()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("age", &self.age())
            .field("dropped_messages", &self.drop_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection(capacity: usize) -> (ClientConnection, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ClientConnection::new(ConnectionId::new(), tx), rx)
    }

    #[tokio::test]
    async fn send_timeout_to_closed_queue() {
        let (conn, rx) = make_connection(4);
        drop(rx);
        let err = conn
            .send_timeout(Arc::new("x".into()), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryFailure::Closed);
        assert_eq!(conn.drop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn send_timeout_on_full_queue() {
        let (conn, _rx) = make_connection(1);
        conn.send_timeout(Arc::new("fill".into()), Duration::from_millis(50))
            .await
            .unwrap();
        let err = conn
            .send_timeout(Arc::new("late".into()), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryFailure::TimedOut);
        assert_eq!(conn.drop_count(), 1);
    }

    #[tokio::test]
    async fn send_timeout_waits_for_room() {
        let (conn, mut rx) = make_connection(1);
        conn.send_timeout(Arc::new("first".into()), Duration::from_secs(5))
            .await
            .unwrap();
        let reader = tokio::spawn(async move {
            let first = rx.recv().await.unwrap();
            let second = rx.recv().await.unwrap();
            (first, second)
        });
        conn.send_timeout(Arc::new("second".into()), Duration::from_secs(5))
            .await
            .unwrap();
        let (first, second) = reader.await.unwrap();
        assert_eq!(&*first, "first");
        assert_eq!(&*second, "second");
    }

    #[test]
    fn mark_alive_and_check() {
        let (conn, _rx) = make_connection(1);
        assert!(conn.check_alive());
        assert!(!conn.check_alive());
        conn.mark_alive();
        assert!(conn.check_alive());
    }

    #[tokio::test]
    async fn release_wakes_waiters() {
        let (conn, _rx) = make_connection(1);
        let conn = Arc::new(conn);
        assert!(!conn.is_released());

        let waiter = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.released().await })
        };
        conn.release();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(conn.is_released());
    }
}
