//! Ping/pong liveness monitoring.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use vcb_sync::ClientConnection;

/// Outcome of the heartbeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The client stopped responding within the timeout window.
    TimedOut,
    /// The heartbeat was cancelled externally.
    Cancelled,
}

/// Consecutive silent ticks tolerated before a client is considered dead.
///
/// `ceil(timeout / interval)`, at least 1.
pub fn max_missed_ticks(interval: Duration, timeout: Duration) -> u32 {
    let interval_ms = interval.as_millis().max(1);
    u32::try_from(timeout.as_millis().div_ceil(interval_ms))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// Watch a connection's activity flag until it goes silent or `cancel` fires.
///
/// Every `interval` the flag is checked and reset. A client that shows no
/// activity (pong or any inbound frame) for [`max_missed_ticks`] consecutive
/// ticks yields [`HeartbeatResult::TimedOut`].
pub async fn run_heartbeat(
    connection: Arc<ClientConnection>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) -> HeartbeatResult {
    let mut ticker = time::interval(interval);
    // the first tick completes immediately
    let _ = ticker.tick().await;
    let max_missed = max_missed_ticks(interval, timeout);
    let mut missed: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if connection.check_alive() {
                    missed = 0;
                } else {
                    missed += 1;
                    if missed >= max_missed {
                        return HeartbeatResult::TimedOut;
                    }
                }
            }
            () = cancel.cancelled() => {
                return HeartbeatResult::Cancelled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use vcb_core::ConnectionId;

    fn make_connection() -> Arc<ClientConnection> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(ClientConnection::new(ConnectionId::new(), tx))
    }

    #[test]
    fn max_missed_rounds_up() {
        assert_eq!(
            max_missed_ticks(Duration::from_secs(30), Duration::from_secs(90)),
            3
        );
        assert_eq!(
            max_missed_ticks(Duration::from_millis(100), Duration::from_millis(250)),
            3
        );
        assert_eq!(max_missed_ticks(Duration::from_secs(10), Duration::ZERO), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_first_check() {
        let conn = make_connection();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = run_heartbeat(
            conn,
            Duration::from_secs(100),
            Duration::from_secs(300),
            cancel,
        )
        .await;
        assert_eq!(result, HeartbeatResult::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_times_out_after_window() {
        let conn = make_connection();
        let started = time::Instant::now();

        let result = run_heartbeat(
            conn,
            Duration::from_millis(100),
            Duration::from_millis(300),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(result, HeartbeatResult::TimedOut);
        // one tick consumes the initial alive flag, three more miss
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn active_client_stays_alive() {
        let conn = make_connection();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_heartbeat(
            Arc::clone(&conn),
            Duration::from_millis(50),
            Duration::from_millis(100),
            cancel.clone(),
        ));

        for _ in 0..20 {
            time::sleep(Duration::from_millis(20)).await;
            conn.mark_alive();
        }

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), HeartbeatResult::Cancelled);
    }
}
