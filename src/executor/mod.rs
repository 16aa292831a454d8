//! Module execution engine
//!
//! A deadline-bound wrapper around a single module, and the scheduler that
//! runs enabled modules sequentially, in bounded parallel chunks, or in
//! hybrid phases.

mod parallel;
mod runner;
mod scheduler;

pub use parallel::run_chunked;
pub use runner::execute_module;
pub use scheduler::Scheduler;
