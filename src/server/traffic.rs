//! Traffic listener wrapping the application's request handler
//!
//! The handler itself is an external collaborator: any `axum::Router`.
//! This module only adds request accounting and the graceful close
//! semantics of [`ServerHandle`].

use super::handle::{bind_listener, ServerError, ServerHandle};
use super::metrics::SharedMetrics;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::debug;

/// Traffic server bound to its address but not yet accepting
pub struct TrafficServer {
    listener: TcpListener,
    router: Router,
}

impl TrafficServer {
    /// Bind the traffic listener
    ///
    /// Bind failures (address in use, permission denied) are fatal and
    /// returned as [`ServerError::Bind`].
    pub async fn bind(
        addr: SocketAddr,
        handler: Router,
        metrics: SharedMetrics,
    ) -> Result<Self, ServerError> {
        let listener = bind_listener(addr).await?;
        let router = handler.layer(middleware::from_fn_with_state(metrics, track_request));
        Ok(Self { listener, router })
    }

    /// Start accepting connections in a background task
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        ServerHandle::spawn("traffic", self.listener, self.router)
    }
}

/// Keeps the in-flight gauge honest even if the request future is dropped
struct InFlightGuard {
    metrics: SharedMetrics,
}

impl InFlightGuard {
    fn enter(metrics: SharedMetrics) -> Self {
        metrics.traffic_requests_in_flight.inc();
        Self { metrics }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.traffic_requests_in_flight.dec();
    }
}

async fn track_request(
    State(metrics): State<SharedMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let _guard = InFlightGuard::enter(metrics.clone());

    let response = next.run(request).await;

    let status = response.status().as_u16();
    metrics.record_traffic_response(status);
    debug!(method = %method, path = %path, status = status, "Traffic request completed");
    response
}
