//! drainkeeper: lifecycle controller for a single traffic-serving process
//!
//! Runs a traffic listener next to an independent control listener that
//! reports readiness and coordinates draining before termination.

pub mod config;
pub mod demo;
pub mod lifecycle;
pub mod server;

pub use config::{Config, ConfigError};
pub use lifecycle::{LifecycleCoordinator, Phase, PhaseTracker, RunningLifecycle};
pub use server::{ReadinessState, ServerError, ServerHandle, ServerStatus, TrafficServer};
