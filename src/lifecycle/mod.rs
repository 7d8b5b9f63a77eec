//! Process lifecycle: phase tracking and the coordinator that drives it
//!
//! # Data Flow
//! ```text
//! start:     bind traffic + control → spawn both → Ready
//! /prestop:  not ready → Draining (traffic keeps serving)
//! SIGTERM:   not ready → ShuttingDown → close traffic, drain → Stopped
//! ```

mod coordinator;
mod phase;

pub use coordinator::{LifecycleCoordinator, RunningLifecycle};
pub use phase::{Phase, PhaseTracker};

#[cfg(test)]
#[path = "phase_test.rs"]
mod phase_tests;

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_tests;
