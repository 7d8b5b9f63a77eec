//! Prometheus metrics for the traffic and control listeners

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics shared between both listeners
pub type SharedMetrics = Arc<LifecycleMetrics>;

/// Registry plus the handful of series drainkeeper exports
pub struct LifecycleMetrics {
    registry: Registry,
    /// Completed traffic requests, labelled by HTTP status code
    pub traffic_requests_total: IntCounterVec,
    /// Traffic requests currently being handled
    pub traffic_requests_in_flight: IntGauge,
    /// Readiness probe answers, labelled `ready` / `not_ready`
    pub readiness_checks_total: IntCounterVec,
    pub prestop_requests_total: IntCounter,
}

impl LifecycleMetrics {
    /// Record one readiness probe answer
    pub fn record_readiness_check(&self, ready: bool) {
        let result = if ready { "ready" } else { "not_ready" };
        self.readiness_checks_total
            .with_label_values(&[result])
            .inc();
    }

    /// Record one completed traffic request
    pub fn record_traffic_response(&self, status: u16) {
        let status = status.to_string();
        self.traffic_requests_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    /// Encode all registered metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Create the metrics registry with every drainkeeper series registered
pub fn create_metrics() -> Result<SharedMetrics, prometheus::Error> {
    let registry = Registry::new();

    let traffic_requests_total = IntCounterVec::new(
        Opts::new(
            "drainkeeper_traffic_requests_total",
            "Traffic requests completed, by status code",
        ),
        &["status"],
    )?;
    let traffic_requests_in_flight = IntGauge::new(
        "drainkeeper_traffic_requests_in_flight",
        "Traffic requests currently in flight",
    )?;
    let readiness_checks_total = IntCounterVec::new(
        Opts::new(
            "drainkeeper_readiness_checks_total",
            "Readiness probe answers, by result",
        ),
        &["result"],
    )?;
    let prestop_requests_total = IntCounter::new(
        "drainkeeper_prestop_requests_total",
        "Drain requests received on /prestop",
    )?;

    registry.register(Box::new(traffic_requests_total.clone()))?;
    registry.register(Box::new(traffic_requests_in_flight.clone()))?;
    registry.register(Box::new(readiness_checks_total.clone()))?;
    registry.register(Box::new(prestop_requests_total.clone()))?;

    Ok(Arc::new(LifecycleMetrics {
        registry,
        traffic_requests_total,
        traffic_requests_in_flight,
        readiness_checks_total,
        prestop_requests_total,
    }))
}
