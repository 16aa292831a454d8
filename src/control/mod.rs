//! Run control
//!
//! The two resources owned by the orchestrator for the length of a run:
//! the emergency stop flag and the connection to the system under test.

mod connection;
mod emergency_stop;

pub use connection::{Connection, HttpConnection};
pub use emergency_stop::{EmergencyStop, InterruptAction, StopReason};
