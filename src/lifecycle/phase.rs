//! Lifecycle phase tracking
//!
//! ```text
//! Initializing ──▶ Ready ──▶ Draining ──▶ ShuttingDown ──▶ Stopped
//!                    └──────────────────────▲
//! ```
//! Phases only move forward. `Draining` is optional: it is entered from
//! `/prestop` and never forces shutdown on its own.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initializing,
    Ready,
    Draining,
    ShuttingDown,
    Stopped,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Ready => "ready",
            Phase::Draining => "draining",
            Phase::ShuttingDown => "shutting_down",
            Phase::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, observable lifecycle phase
///
/// Clones share the same phase.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    sender: Arc<watch::Sender<Phase>>,
}

impl PhaseTracker {
    /// Create a tracker in `Initializing`
    pub fn new() -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(Phase::Initializing)),
        }
    }

    pub fn current(&self) -> Phase {
        *self.sender.borrow()
    }

    /// Move to `next` if it lies ahead of the current phase
    ///
    /// Returns `true` if the transition happened. Backward or repeated
    /// transitions are ignored.
    pub fn advance(&self, next: Phase) -> bool {
        let mut from = Phase::Initializing;
        let moved = self.sender.send_if_modified(|phase| {
            if next > *phase {
                from = *phase;
                *phase = next;
                true
            } else {
                false
            }
        });
        if moved {
            info!(from = %from, to = %next, "Lifecycle phase changed");
        }
        moved
    }

    /// Subscribe to phase changes
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.sender.subscribe()
    }

    /// Wait until the phase has reached `target` (or gone past it)
    pub async fn reached(&self, target: Phase) {
        let mut receiver = self.subscribe();
        let _ = receiver.wait_for(|phase| *phase >= target).await;
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
