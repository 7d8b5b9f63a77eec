//! HTTP listeners and the state they share
//!
//! Two independent listeners:
//! - traffic: the application's own handler, closed gracefully on shutdown
//! - control: `/ready` and `/prestop` for the orchestrator, plus liveness,
//!   status and metrics
//!
//! Also provides the shutdown channel and SIGTERM/SIGINT forwarding.

pub mod control;
mod handle;
pub mod metrics;
mod readiness;
pub mod shutdown;
mod traffic;

pub use control::{ControlServer, ControlState, DEFAULT_PRESTOP_GRACE};
pub use handle::{ServerError, ServerHandle, ServerStatus};
pub use metrics::{create_metrics, SharedMetrics};
pub use readiness::ReadinessState;
pub use shutdown::{listen_for_termination, shutdown_channel, ShutdownController, ShutdownSignal};
pub use traffic::TrafficServer;

#[cfg(test)]
#[path = "readiness_test.rs"]
mod readiness_tests;

#[cfg(test)]
#[path = "control_test.rs"]
mod control_tests;

#[cfg(test)]
#[path = "traffic_test.rs"]
mod traffic_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_tests;
