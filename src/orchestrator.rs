//! Suite orchestrator
//!
//! Drives one suite run: validate, arm the emergency stop, connect, schedule
//! modules, reduce and analyse, then release everything. Cleanup runs on
//! every path out of [`SuiteOrchestrator::execute`].

use chrono::Utc;
use futures::FutureExt;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::SuiteConfig;
use crate::control::{Connection, EmergencyStop, HttpConnection};
use crate::error::{Result, SuiteError};
use crate::executor::Scheduler;
use crate::models::{ModuleKind, ModulePlan, SuiteMetadata, SuiteResult};
use crate::modules::ModuleRegistry;
use crate::results;
use crate::utils::Timer;

/// Top-level driver of a suite run
pub struct SuiteOrchestrator {
    config: SuiteConfig,
    plan: ModulePlan,
    registry: ModuleRegistry,
    connection: Arc<dyn Connection>,
    emergency_stop: EmergencyStop,
}

impl SuiteOrchestrator {
    pub fn new(
        config: SuiteConfig,
        registry: ModuleRegistry,
        connection: Arc<dyn Connection>,
    ) -> Self {
        Self {
            config,
            plan: ModulePlan::standard(),
            registry,
            connection,
            emergency_stop: EmergencyStop::new(),
        }
    }

    /// Wire probe modules and an HTTP connection from configuration
    pub fn from_config(config: SuiteConfig) -> Result<Self> {
        config.validate()?;
        let registry = ModuleRegistry::from_config(&config)?;
        let connection = HttpConnection::from_config(&config.target)?;
        Ok(Self::new(config, registry, Arc::new(connection)))
    }

    /// Replace the standard module plan
    pub fn with_plan(mut self, plan: ModulePlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Handle for requesting a stop from outside the run
    pub fn emergency_stop(&self) -> EmergencyStop {
        self.emergency_stop.clone()
    }

    /// Run the suite.
    ///
    /// Configuration and connection failures are returned as errors and
    /// produce no result. Module failures only show up inside the result.
    ///
    /// A panic on the scheduling path is resumed after cleanup. Dropping the
    /// returned future mid-run still disarms the stop and disconnects.
    pub async fn execute(&self) -> Result<SuiteResult> {
        let mut guard = CleanupGuard::new(self.emergency_stop.clone(), self.connection.clone());
        let outcome = AssertUnwindSafe(self.run()).catch_unwind().await;
        guard.disarm();
        self.cleanup().await;

        match outcome {
            Ok(Err(e)) => {
                error!("Suite run aborted: {}", e);
                Err(e)
            }
            Ok(result) => result,
            Err(panic) => {
                error!("Suite run panicked");
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn run(&self) -> Result<SuiteResult> {
        let start_time = Utc::now();
        let timer = Timer::start("suite run");

        self.config.validate()?;
        let enabled: BTreeSet<ModuleKind> = self.config.enabled_kinds()?;

        info!(
            "Starting suite: {} modules, {} mode, environment {}",
            enabled.len(),
            self.config.execution_mode,
            self.config.environment
        );

        if self.config.execution.emergency_stop_enabled {
            self.emergency_stop.enable();
        }

        self.connection
            .connect()
            .await
            .map_err(|e| SuiteError::connection(format!("{e:#}")))?;

        let scheduler = Scheduler::new(
            self.plan.clone(),
            self.registry.clone(),
            self.config.execution.clone(),
        )
        .with_emergency_stop(self.emergency_stop.clone());

        let modules = scheduler
            .run_enabled_modules(self.config.execution_mode, &enabled)
            .await?;

        let mut overall = results::reduce(&modules);
        let analysis = results::derive(&modules, &self.config.quality_thresholds);
        results::settle_success(&mut overall, &analysis);
        overall.execution_time_ms = timer.stop().as_millis() as u64;

        let result = SuiteResult {
            overall,
            modules,
            analysis,
            metadata: SuiteMetadata {
                start_time,
                end_time: Utc::now(),
                environment_label: self.config.environment.clone(),
                suite_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        info!("Suite finished: {}", result);
        Ok(result)
    }

    /// Disarm the stop flag and disconnect. Errors are logged, never returned.
    async fn cleanup(&self) {
        self.emergency_stop.disable();

        if let Err(e) = self.connection.disconnect().await {
            let err = SuiteError::Cleanup(format!("{e:#}"));
            warn!("{}", err);
        }
    }
}

/// Releases run resources when `execute` is dropped before its own cleanup
struct CleanupGuard {
    emergency_stop: EmergencyStop,
    connection: Option<Arc<dyn Connection>>,
}

impl CleanupGuard {
    fn new(emergency_stop: EmergencyStop, connection: Arc<dyn Connection>) -> Self {
        Self {
            emergency_stop,
            connection: Some(connection),
        }
    }

    fn disarm(&mut self) {
        self.connection = None;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        warn!("Suite run cancelled, releasing connection");
        self.emergency_stop.disable();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = connection.disconnect().await {
                        warn!("{}", SuiteError::Cleanup(format!("{e:#}")));
                    }
                });
            }
            Err(_) => warn!(
                "{}",
                SuiteError::Cleanup("no runtime left to disconnect on".to_string())
            ),
        }
    }
}
