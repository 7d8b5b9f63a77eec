//! Control endpoints for orchestration probes and drain hooks
//!
//! - `/ready` - Readiness: should this process receive new traffic?
//! - `/prestop` - Drain: mark not ready, then hold the caller for the grace interval
//! - `/healthz` - Liveness: Is the process alive?
//! - `/status` - Current lifecycle phase and readiness as JSON
//! - `/metrics` - Prometheus metrics in text format

use super::handle::{bind_listener, ServerError, ServerHandle};
use super::metrics::SharedMetrics;
use super::readiness::ReadinessState;
use crate::lifecycle::{Phase, PhaseTracker};
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Default pause applied by `/prestop` after marking not ready
pub const DEFAULT_PRESTOP_GRACE: Duration = Duration::from_secs(3);

/// Shared state for the control endpoints
#[derive(Clone)]
pub struct ControlState {
    readiness: ReadinessState,
    phase: PhaseTracker,
    metrics: SharedMetrics,
    prestop_grace: Duration,
}

impl ControlState {
    pub fn new(
        readiness: ReadinessState,
        phase: PhaseTracker,
        metrics: SharedMetrics,
        prestop_grace: Duration,
    ) -> Self {
        Self {
            readiness,
            phase,
            metrics,
            prestop_grace,
        }
    }
}

/// Body of `/status`
#[derive(Debug, Serialize)]
struct StatusBody {
    phase: Phase,
    ready: bool,
}

/// Readiness probe handler
///
/// Returns 200 OK if ready, 500 Internal Server Error if not.
async fn ready(State(state): State<ControlState>) -> StatusCode {
    let ready = state.readiness.is_ready();
    state.metrics.record_readiness_check(ready);
    if ready {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Drain hook handler
///
/// The readiness flag is cleared before the pause starts, so any `/ready`
/// call that begins after this point already sees not ready. The pause
/// gives probing infrastructure time to stop routing before the
/// orchestrator goes on to terminate the process.
async fn prestop(State(state): State<ControlState>) -> StatusCode {
    state.readiness.set_not_ready();
    state.phase.advance(Phase::Draining);
    state.metrics.prestop_requests_total.inc();
    info!(
        grace_ms = state.prestop_grace.as_millis() as u64,
        "Prestop received, marked not ready"
    );

    tokio::time::sleep(state.prestop_grace).await;
    StatusCode::OK
}

/// Liveness probe handler
///
/// Always returns 200 OK - if this responds, the process is alive.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn status(State(state): State<ControlState>) -> Json<StatusBody> {
    Json(StatusBody {
        phase: state.phase.current(),
        ready: state.readiness.is_ready(),
    })
}

/// Prometheus metrics handler
async fn metrics(State(state): State<ControlState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}

/// Build the router for the control endpoints
fn build_router(state: ControlState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/prestop", get(prestop))
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/metrics", get(self::metrics))
        .with_state(state)
}

/// Control server bound to its address but not yet accepting
pub struct ControlServer {
    listener: TcpListener,
    router: Router,
}

impl ControlServer {
    /// Bind the control listener; failure is fatal
    pub async fn bind(addr: SocketAddr, state: ControlState) -> Result<Self, ServerError> {
        let listener = bind_listener(addr).await?;
        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    /// Start serving the control endpoints in a background task
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        ServerHandle::spawn("control", self.listener, self.router)
    }
}
