//! Running listener handle shared by the traffic and control servers

use super::shutdown::{shutdown_channel, ShutdownController};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Errors that end a listener's lifetime
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Where a listener is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Accepting connections
    Running,
    /// Close requested, in-flight connections still finishing
    Closing,
    /// Serve loop returned; nothing is accepted or in flight
    Stopped,
}

/// Bind a TCP listener, mapping failure to the fatal `Bind` error
pub(crate) async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Handle to a listener serving in a background task
///
/// Closing is graceful: accept stops at once, accepted connections finish
/// their current request, and only then does the status turn `Stopped`.
/// There is no deadline on that drain.
pub struct ServerHandle {
    name: &'static str,
    local_addr: SocketAddr,
    shutdown: ShutdownController,
    status: Arc<watch::Sender<ServerStatus>>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// Spawn `router` on `listener` and return its handle
    pub(crate) fn spawn(
        name: &'static str,
        listener: TcpListener,
        router: Router,
    ) -> Result<Self, ServerError> {
        let local_addr = listener.local_addr()?;
        let (shutdown, mut signal) = shutdown_channel();
        let status = Arc::new(watch::Sender::new(ServerStatus::Running));

        let task_status = status.clone();
        let task = tokio::spawn(async move {
            info!(server = name, addr = %local_addr, "Listening");
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.wait().await })
                .await
                .map_err(ServerError::Serve);
            task_status.send_replace(ServerStatus::Stopped);
            info!(server = name, addr = %local_addr, "Stopped");
            result
        });

        Ok(Self {
            name,
            local_addr,
            shutdown,
            status,
            task,
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn status(&self) -> ServerStatus {
        *self.status.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.status() == ServerStatus::Running
    }

    /// Resolve once the serve loop has returned, for whatever reason
    pub async fn stopped(&self) {
        let mut status = self.status.subscribe();
        // Err means the sender is gone, which only happens once we are stopped
        let _ = status.wait_for(|s| *s == ServerStatus::Stopped).await;
    }

    /// Stop accepting and let in-flight connections finish
    ///
    /// Returns at once; the status reads `Closing` until the last accepted
    /// connection is done, then `Stopped`. Cannot be taken back.
    pub fn begin_close(&self) {
        let started = self.status.send_if_modified(|status| {
            if *status == ServerStatus::Running {
                *status = ServerStatus::Closing;
                true
            } else {
                false
            }
        });
        if started {
            info!(server = self.name, addr = %self.local_addr, "Closing gracefully");
        }
        self.shutdown.trigger();
    }

    /// Gracefully close the listener and wait for in-flight work
    ///
    /// Returns `Ok(())` for a normal close. Not cancellable in effect: once
    /// the trigger is sent the server drains even if this future is dropped.
    pub async fn close(self) -> Result<(), ServerError> {
        self.begin_close();
        self.join().await
    }

    /// Wait for the serve task to finish and surface its outcome
    pub async fn join(self) -> Result<(), ServerError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }

    /// Drop the listener without draining
    pub fn abort(self) {
        debug!(server = self.name, "Aborting listener");
        self.task.abort();
    }
}
