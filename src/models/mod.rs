//! Data models for suite orchestration
//!
//! Module identities and execution plans, per-module results, and the
//! final suite result handed to reporting.

mod module;
mod module_result;
mod suite_result;

pub use module::{ModuleDescriptor, ModuleKind, ModulePlan, Phase};
pub use module_result::{ModuleMetrics, ModuleResult, ModuleRunRecord};
pub use suite_result::{Analysis, OverallResult, SuiteMetadata, SuiteResult};
