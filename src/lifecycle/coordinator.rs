//! Lifecycle coordinator
//!
//! Binds both listeners, flips readiness once they are up, then waits for
//! either a termination request or the traffic server finishing by itself.
//! Termination closes the traffic server gracefully with no deadline; the
//! control server is left running until the coordinator returns so probes
//! keep answering during the drain.

use super::phase::{Phase, PhaseTracker};
use crate::config::Config;
use crate::server::{
    ControlServer, ControlState, ReadinessState, ServerError, ServerHandle, SharedMetrics,
    ShutdownSignal, TrafficServer,
};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info, warn};

/// Owns the readiness flag and phase for one server instance
pub struct LifecycleCoordinator {
    traffic_addr: SocketAddr,
    control_addr: SocketAddr,
    prestop_grace: Duration,
    readiness: ReadinessState,
    phase: PhaseTracker,
    metrics: SharedMetrics,
}

/// What ended the wait in [`RunningLifecycle::run_until`]
enum Trigger {
    Termination,
    TrafficStopped,
}

impl LifecycleCoordinator {
    pub fn new(config: &Config, metrics: SharedMetrics) -> Self {
        Self {
            traffic_addr: config.traffic_addr,
            control_addr: config.control_addr,
            prestop_grace: config.prestop_grace,
            readiness: ReadinessState::new(),
            phase: PhaseTracker::new(),
            metrics,
        }
    }

    /// Readiness flag handed to the control server
    pub fn readiness(&self) -> &ReadinessState {
        &self.readiness
    }

    pub fn phase(&self) -> &PhaseTracker {
        &self.phase
    }

    /// Bind and start both listeners, then mark the process ready
    ///
    /// Readiness is flipped only after both binds succeeded. A bind failure
    /// on either listener is returned as-is and nothing is retried.
    pub async fn start(self, handler: Router) -> Result<RunningLifecycle, ServerError> {
        let traffic = TrafficServer::bind(self.traffic_addr, handler, self.metrics.clone()).await?;

        let control_state = ControlState::new(
            self.readiness.clone(),
            self.phase.clone(),
            self.metrics.clone(),
            self.prestop_grace,
        );
        let control = ControlServer::bind(self.control_addr, control_state).await?;

        let traffic = traffic.start()?;
        let control = match control.start() {
            Ok(control) => control,
            Err(e) => {
                traffic.abort();
                return Err(e);
            }
        };

        // A drain that raced startup wins: stay not ready
        if self.phase.advance(Phase::Ready) {
            self.readiness.set_ready();
            info!(
                traffic = %traffic.local_addr(),
                control = %control.local_addr(),
                "Listeners up, marked ready"
            );
        } else {
            warn!(phase = %self.phase.current(), "Drain requested during startup, staying not ready");
        }

        Ok(RunningLifecycle {
            traffic,
            control,
            readiness: self.readiness,
            phase: self.phase,
        })
    }

    /// Start, then run until `shutdown` fires or the traffic server stops
    pub async fn run(self, handler: Router, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        self.start(handler).await?.run_until(shutdown).await
    }
}

/// Both listeners up and serving
pub struct RunningLifecycle {
    traffic: ServerHandle,
    control: ServerHandle,
    readiness: ReadinessState,
    phase: PhaseTracker,
}

impl RunningLifecycle {
    pub fn traffic_addr(&self) -> SocketAddr {
        self.traffic.local_addr()
    }

    pub fn control_addr(&self) -> SocketAddr {
        self.control.local_addr()
    }

    pub fn readiness(&self) -> &ReadinessState {
        &self.readiness
    }

    pub fn phase(&self) -> &PhaseTracker {
        &self.phase
    }

    /// Block until termination or traffic completion, then finish shutdown
    pub async fn run_until(self, mut shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let trigger = tokio::select! {
            _ = shutdown.wait() => Trigger::Termination,
            _ = self.traffic.stopped() => Trigger::TrafficStopped,
        };

        self.readiness.set_not_ready();
        self.phase.advance(Phase::ShuttingDown);

        let result = match trigger {
            Trigger::Termination => {
                info!("Termination received, draining traffic server");
                self.traffic.close().await
            }
            // axum only returns after the shutdown future fires, so this
            // means the serve task panicked or was aborted
            Trigger::TrafficStopped => {
                warn!("Traffic server stopped without a termination request");
                self.traffic.join().await
            }
        };

        match &result {
            Ok(()) => info!("Traffic server drained"),
            Err(e) => error!(error = %e, "Traffic server failed"),
        }
        self.phase.advance(Phase::Stopped);

        // The control listener ends with the process
        self.control.abort();
        result
    }
}
