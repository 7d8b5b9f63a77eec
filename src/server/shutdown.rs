//! Shutdown trigger shared by OS signals, listeners and tests
//!
//! A `ShutdownController` fires once; every cloned `ShutdownSignal` observes
//! it. OS termination signals are forwarded onto the same channel so the
//! coordinator never cares where the request came from. Each listener owns
//! a private pair too, which is how `ServerHandle` starts its drain.

use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Receiving side of the shutdown channel
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once the controller fired or was dropped
    ///
    /// A dropped controller counts as shutdown: a listener whose handle is
    /// gone drains instead of serving forever.
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|fired| *fired).await;
    }
}

/// Sending side of the shutdown channel
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    /// Fire the signal; repeated calls are no-ops
    pub fn trigger(&self) {
        // send_replace keeps working after every receiver is gone
        if !self.sender.send_replace(true) {
            debug!("Shutdown triggered");
        }
    }
}

/// Create a connected controller/signal pair
pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Register termination handlers and forward the first one to `controller`
///
/// Registration happens before this returns, so a signal delivered right
/// after the call is not lost. Must be called from within a tokio runtime.
pub fn listen_for_termination(controller: ShutdownController) -> std::io::Result<JoinHandle<()>> {
    let termination = TerminationSignals::register()?;
    Ok(forward_termination(termination.recv(), controller))
}

/// Fire `controller` once `source` yields the name of what asked to stop
pub(crate) fn forward_termination<F>(source: F, controller: ShutdownController) -> JoinHandle<()>
where
    F: Future<Output = &'static str> + Send + 'static,
{
    tokio::spawn(async move {
        let name = source.await;
        info!(signal = name, "Termination requested");
        controller.trigger();
    })
}

/// SIGTERM and SIGINT, registered together
#[cfg(unix)]
struct TerminationSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

/// Ctrl+C only (Windows)
#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to wait for Ctrl+C");
            std::future::pending::<()>().await;
        }
        "CTRL_C"
    }
}
