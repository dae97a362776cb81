//! Session lifecycle states.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Driver loop state machine.
///
/// `Idle -> Starting -> Running -> Stopping -> Idle`. A failed start
/// returns straight to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture active.
    Idle,
    /// Device acquired, waiting for the source to report its resolution.
    Starting,
    /// Frames are sampled, delayed and presented every tick.
    Running,
    /// Tearing down; no frames are sampled or presented.
    Stopping,
}

impl SessionState {
    /// Checks if this state transition is valid.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, target),
            (Idle, Starting)
                | (Starting, Running)
                | (Starting, Idle)
                | (Starting, Stopping)
                | (Running, Stopping)
                | (Running, Idle)
                | (Stopping, Idle)
        )
    }

    /// True while a capture device is held.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Running)
    }

    /// Human-readable state name.
    pub fn description(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Starting => "Starting",
            SessionState::Running => "Running",
            SessionState::Stopping => "Stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Cross-thread stop request, observed at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// A handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop; every clone observes it.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once a stop was requested.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the handle can drive another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
