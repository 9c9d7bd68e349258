//! Accept loop for REPL sessions.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::dispatch::CommandDispatcher;
use crate::error::ReplResult;

use super::handle_session;

/// Session metrics for monitoring.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// Total sessions served.
    pub sessions_total: AtomicU64,
    /// Sessions that ended with a transport error.
    pub sessions_failed: AtomicU64,
    /// Currently active sessions.
    pub active_sessions: AtomicUsize,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished session.
    pub fn record_session(&self, success: bool) {
        self.sessions_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.sessions_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get total session count.
    pub fn total_sessions(&self) -> u64 {
        self.sessions_total.load(Ordering::Relaxed)
    }

    /// Get failed session count.
    pub fn failed_sessions(&self) -> u64 {
        self.sessions_failed.load(Ordering::Relaxed)
    }

    /// Get active session count.
    pub fn active(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }
}

/// TCP server that hands each accepted connection its own session.
pub struct ReplListener {
    listener: TcpListener,
    settings: Arc<Settings>,
    dispatcher: Arc<dyn CommandDispatcher>,
    metrics: Arc<SessionMetrics>,
    /// Semaphore for session limiting
    session_semaphore: Arc<Semaphore>,
}

impl ReplListener {
    /// Bind a new listener on the configured address.
    pub async fn bind(
        settings: Arc<Settings>,
        dispatcher: Arc<dyn CommandDispatcher>,
    ) -> ReplResult<Self> {
        let listener = TcpListener::bind(settings.listen.addr.as_str()).await?;

        let metrics = Arc::new(SessionMetrics::new());
        let session_semaphore = Arc::new(Semaphore::new(settings.limits.max_concurrent_sessions));

        info!(
            addr = %settings.listen.addr,
            max_sessions = settings.limits.max_concurrent_sessions,
            "REPL listener bound"
        );

        Ok(Self {
            listener,
            settings,
            dispatcher,
            metrics,
            session_semaphore,
        })
    }

    /// Get session metrics.
    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> ReplResult<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop.
    ///
    /// Stops accepting new sessions when `shutdown` is notified. Active
    /// sessions continue until their peers disconnect.
    pub async fn run(&self, shutdown: Arc<Notify>) -> ReplResult<()> {
        info!("REPL listener running, waiting for connections...");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            // Try to acquire a session permit
                            let permit = match self.session_semaphore.clone().try_acquire_owned() {
                                Ok(permit) => permit,
                                Err(_) => {
                                    warn!(
                                        max = self.settings.limits.max_concurrent_sessions,
                                        "Session limit reached, rejecting connection"
                                    );
                                    // Connection is dropped, rejecting the client
                                    continue;
                                }
                            };

                            let dispatcher = Arc::clone(&self.dispatcher);
                            let metrics = Arc::clone(&self.metrics);
                            let max_frame_size = self.settings.limits.max_frame_size;
                            let recv_timeout_millis = self.settings.limits.recv_timeout_millis;

                            metrics.active_sessions.fetch_add(1, Ordering::Relaxed);
                            debug!(peer = %addr, active = metrics.active(), "Session accepted");

                            // Each session is its own task; the permit is
                            // released when the task completes.
                            tokio::spawn(async move {
                                let _permit = permit;
                                let success = match handle_session(
                                    stream,
                                    dispatcher,
                                    max_frame_size,
                                    recv_timeout_millis,
                                ).await {
                                    Ok(()) => true,
                                    Err(e) => {
                                        error!(peer = %addr, error = %e, "Session failed");
                                        false
                                    }
                                };

                                metrics.record_session(success);
                                metrics.active_sessions.fetch_sub(1, Ordering::Relaxed);
                                debug!(
                                    peer = %addr,
                                    active = metrics.active(),
                                    success = success,
                                    "Session ended"
                                );
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown.notified() => {
                    info!("Shutdown signal received, stopping listener");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Wait for all active sessions to drain.
    pub async fn wait_for_drain(&self) {
        let poll_interval = std::time::Duration::from_millis(100);

        while self.metrics.active() > 0 {
            debug!(active = self.metrics.active(), "Waiting for sessions to drain");
            tokio::time::sleep(poll_interval).await;
        }

        info!("All sessions drained");
    }
}
