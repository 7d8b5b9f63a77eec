//! Readiness flag shared between the coordinator and the control server

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared state for readiness tracking
///
/// The coordinator owns the state and hands clones to the control server;
/// every clone points at the same flag. Reads never block each other.
#[derive(Debug, Clone)]
pub struct ReadinessState {
    ready: Arc<AtomicBool>,
}

impl ReadinessState {
    /// Create a new readiness state (initially not ready)
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the flag
    pub fn set(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Mark the process as ready to receive traffic
    pub fn set_ready(&self) {
        self.set(true);
    }

    /// Mark the process as not ready (drain or shutdown)
    ///
    /// The readiness probe returns 500 from here on, so the orchestrator
    /// stops routing new traffic to this instance.
    pub fn set_not_ready(&self) {
        self.set(false);
    }

    /// Current value; never waits on other readers or the writer
    pub fn get(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Check if the process is ready
    pub fn is_ready(&self) -> bool {
        self.get()
    }
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::new()
    }
}
