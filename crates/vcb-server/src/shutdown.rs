//! Graceful shutdown of the listener and the push sessions it spawned.
//!
//! Every WebSocket session runs on a child of the coordinator's token and is
//! registered with its session tracker. Shutdown cancels the token, which
//! stops the listener from accepting and makes each session send a close
//! frame and unregister, then waits for both to drain.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TrackedFuture;
use tracing::{info, warn};

/// How long shutdown waits for sessions when the caller gives no bound.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the server-wide cancellation token and the set of live sessions.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    sessions: TaskTracker,
}

impl ShutdownCoordinator {
    /// Create a coordinator with no sessions.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            sessions: TaskTracker::new(),
        }
    }

    /// Token cancelled when shutdown starts.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wrap a session future so shutdown waits for it to finish.
    pub fn track_session<F: Future>(&self, session: F) -> TrackedFuture<F> {
        self.sessions.track_future(session)
    }

    /// Sessions that have not finished yet.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Start shutdown without waiting.
    pub fn shutdown(&self) {
        self.token.cancel();
        let _ = self.sessions.close();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Start shutdown, then wait up to `timeout` for the listener task and
    /// every tracked session.
    ///
    /// Returns `false` if something was still running when the timeout hit.
    pub async fn graceful_shutdown(
        &self,
        listener: JoinHandle<()>,
        timeout: Option<Duration>,
    ) -> bool {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        self.shutdown();
        info!(
            sessions = self.active_sessions(),
            timeout_secs = timeout.as_secs(),
            "draining listener and sessions"
        );

        let drain = async {
            let _ = listener.await;
            self.sessions.wait().await;
        };
        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                sessions = self.active_sessions(),
                "shutdown timed out after {timeout:?}"
            );
            return false;
        }
        info!("shutdown complete");
        true
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
