//! Execution scheduler
//!
//! Three strategies share one entry point:
//! - Sequential: plan order, one module at a time, stop-aware
//! - Parallel: barrier-separated chunks of `maxParallelTests`
//! - Hybrid: foundation (sequential), functional (unbounded parallel),
//!   quality (sequential); every phase runs regardless of earlier outcomes

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{execute_module, run_chunked};
use crate::config::{ExecutionMode, ExecutionSettings};
use crate::control::EmergencyStop;
use crate::error::{Result, SuiteError};
use crate::models::{ModuleKind, ModulePlan, ModuleRunRecord, Phase};
use crate::modules::{ModuleRegistry, TestModule};

type Runnable = (ModuleKind, Arc<dyn TestModule>);

/// Runs enabled modules according to an execution mode
#[derive(Clone, Debug)]
pub struct Scheduler {
    plan: ModulePlan,
    registry: ModuleRegistry,
    settings: ExecutionSettings,
    emergency_stop: EmergencyStop,
}

impl Scheduler {
    pub fn new(plan: ModulePlan, registry: ModuleRegistry, settings: ExecutionSettings) -> Self {
        Self {
            plan,
            registry,
            settings,
            emergency_stop: EmergencyStop::new(),
        }
    }

    /// Share the stop flag checked at sequential loop boundaries
    pub fn with_emergency_stop(mut self, emergency_stop: EmergencyStop) -> Self {
        self.emergency_stop = emergency_stop;
        self
    }

    pub fn plan(&self) -> &ModulePlan {
        &self.plan
    }

    /// Run every enabled module.
    ///
    /// Fails with a configuration error, before any module runs, when an
    /// enabled module is missing from the plan or has no registered
    /// capability.
    pub async fn run_enabled_modules(
        &self,
        mode: ExecutionMode,
        enabled: &BTreeSet<ModuleKind>,
    ) -> Result<ModuleRunRecord> {
        let ordered = self.plan.sequence(enabled);
        if let Some(missing) = enabled.iter().find(|kind| !ordered.contains(kind)) {
            return Err(SuiteError::configuration(format!(
                "Module {missing} is not part of the execution plan"
            )));
        }
        let runnable = self.registry.resolve(&ordered)?;

        info!(
            "Running {} modules in {} mode: {}",
            runnable.len(),
            mode,
            ordered
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let start = Instant::now();
        let record = match mode {
            ExecutionMode::Sequential => self.run_sequential(&runnable).await,
            ExecutionMode::Parallel => {
                run_chunked(
                    &runnable,
                    self.settings.max_parallel_tests,
                    self.settings.timeout_per_module(),
                )
                .await
            }
            ExecutionMode::Hybrid => self.run_hybrid(&runnable, enabled).await,
        };

        info!(
            "{} of {} modules ran in {}ms",
            record.len(),
            runnable.len(),
            start.elapsed().as_millis()
        );

        Ok(record)
    }

    /// One module at a time. Modules not reached are absent from the record.
    async fn run_sequential(&self, modules: &[Runnable]) -> ModuleRunRecord {
        let mut record = ModuleRunRecord::new();

        for (kind, module) in modules {
            if self.emergency_stop.is_stop_requested() {
                warn!(
                    "Emergency stop requested ({}), skipping remaining modules",
                    self.emergency_stop
                        .reason()
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "unknown reason".to_string())
                );
                break;
            }

            let result =
                execute_module(*kind, module.clone(), self.settings.timeout_per_module()).await;
            let failed = !result.success;
            record.insert(*kind, result);

            if failed && self.settings.stop_on_first_failure {
                warn!("{} failed, stopping on first failure", kind);
                break;
            }
        }

        record
    }

    async fn run_hybrid(
        &self,
        modules: &[Runnable],
        enabled: &BTreeSet<ModuleKind>,
    ) -> ModuleRunRecord {
        let mut record = ModuleRunRecord::new();

        for phase in Phase::all() {
            let members: Vec<Runnable> = self
                .plan
                .phase_members(phase, enabled)
                .into_iter()
                .filter_map(|member| modules.iter().find(|(kind, _)| *kind == member).cloned())
                .collect();

            if members.is_empty() {
                continue;
            }

            info!("Phase {}: {} modules", phase, members.len());

            let phase_record = match phase {
                Phase::Foundation | Phase::Quality => self.run_sequential(&members).await,
                Phase::Functional => {
                    run_chunked(&members, members.len(), self.settings.timeout_per_module()).await
                }
            };
            record.extend(phase_record);
        }

        record
    }
}
