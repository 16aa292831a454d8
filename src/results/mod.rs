//! Result reduction, analysis and storage
//!
//! Turns a `ModuleRunRecord` into suite totals and qualitative findings,
//! and persists the final `SuiteResult` as JSON.

pub mod aggregator;
pub mod analysis;
mod storage;

pub use aggregator::{quality_score, reduce, settle_success};
pub use analysis::derive;
pub use storage::ResultStore;
