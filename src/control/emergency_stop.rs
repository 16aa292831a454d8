//! Cooperative emergency stop
//!
//! A stop request is only observed at sequential loop boundaries. Running
//! modules are never interrupted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Why a stop was requested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    ManualRequest,
    Signal,
    UnexpectedError,
    TimeoutExceeded,
    ResourceUnavailable,
}

impl StopReason {
    fn to_code(self) -> u8 {
        match self {
            StopReason::ManualRequest => 1,
            StopReason::Signal => 2,
            StopReason::UnexpectedError => 3,
            StopReason::TimeoutExceeded => 4,
            StopReason::ResourceUnavailable => 5,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StopReason::ManualRequest),
            2 => Some(StopReason::Signal),
            3 => Some(StopReason::UnexpectedError),
            4 => Some(StopReason::TimeoutExceeded),
            5 => Some(StopReason::ResourceUnavailable),
            _ => None,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::ManualRequest => "manual request",
            StopReason::Signal => "signal received",
            StopReason::UnexpectedError => "unexpected error",
            StopReason::TimeoutExceeded => "timeout exceeded",
            StopReason::ResourceUnavailable => "resource unavailable",
        };
        write!(f, "{s}")
    }
}

/// Response to an interrupt signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptAction {
    /// A cooperative stop was requested; the current module finishes
    FinishCurrentModule,
    /// Nothing cooperative is left to do; leave the process
    Exit,
}

#[derive(Debug, Default)]
struct StopState {
    armed: AtomicBool,
    requested: AtomicBool,
    reason: AtomicU8,
}

/// Emergency stop handle. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct EmergencyStop {
    state: Arc<StopState>,
}

impl EmergencyStop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the stop for the current run
    pub fn enable(&self) {
        self.state.armed.store(true, Ordering::SeqCst);
        info!("Emergency stop armed");
    }

    /// Disarm and clear any pending request
    pub fn disable(&self) {
        self.state.armed.store(false, Ordering::SeqCst);
        self.state.requested.store(false, Ordering::SeqCst);
        self.state.reason.store(0, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.state.armed.load(Ordering::SeqCst)
    }

    /// Request a stop. Returns false when the stop is not armed or a
    /// request is already pending.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        if !self.is_enabled() {
            return false;
        }

        if self
            .state
            .requested
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        self.state.reason.store(reason.to_code(), Ordering::SeqCst);
        warn!("Emergency stop requested: {}", reason);
        true
    }

    pub fn is_stop_requested(&self) -> bool {
        self.is_enabled() && self.state.requested.load(Ordering::SeqCst)
    }

    /// Reason of the pending request
    pub fn reason(&self) -> Option<StopReason> {
        if !self.is_stop_requested() {
            return None;
        }
        StopReason::from_code(self.state.reason.load(Ordering::SeqCst))
    }

    /// Handle an interrupt signal.
    ///
    /// The first interrupt of an armed run requests a stop. An unarmed run,
    /// or a repeated interrupt, exits.
    pub fn on_interrupt(&self) -> InterruptAction {
        if self.request_stop(StopReason::Signal) {
            InterruptAction::FinishCurrentModule
        } else {
            InterruptAction::Exit
        }
    }
}
