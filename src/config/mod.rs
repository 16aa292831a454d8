//! Configuration module
//!
//! Suite configuration: execution mode, enabled modules, execution control,
//! quality thresholds and the target system. Loaded from YAML/JSON files
//! and overridden from the environment and the command line.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::{find_config_file, CONFIG_LOCATIONS};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use crate::error::{Result, SuiteError};
use crate::models::ModuleKind;

/// Module scheduling strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Parallel,
    #[default]
    Hybrid,
}

impl ExecutionMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "seq" => Some(ExecutionMode::Sequential),
            "parallel" | "par" => Some(ExecutionMode::Parallel),
            "hybrid" => Some(ExecutionMode::Hybrid),
            _ => None,
        }
    }

    /// Parse or fail with a configuration error
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| {
            SuiteError::configuration(format!(
                "Unsupported execution mode: {s} (expected sequential, parallel or hybrid)"
            ))
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Execution control settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionSettings {
    /// Chunk size for parallel execution
    pub max_parallel_tests: usize,

    /// Deadline for a single module, in milliseconds
    pub timeout_per_module_ms: u64,

    /// Retry budget handed to module implementations
    pub retry_attempts: u32,

    /// Stop a sequential run at the first failed module
    pub stop_on_first_failure: bool,

    /// Arm the emergency stop for the run
    pub emergency_stop_enabled: bool,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            max_parallel_tests: 3,
            timeout_per_module_ms: 300_000,
            retry_attempts: 2,
            stop_on_first_failure: false,
            emergency_stop_enabled: true,
        }
    }
}

impl ExecutionSettings {
    pub fn timeout_per_module(&self) -> Duration {
        Duration::from_millis(self.timeout_per_module_ms)
    }
}

/// Thresholds consumed by the analysis engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityThresholds {
    /// Minimum acceptable pass rate, percent
    pub minimum_pass_rate: f64,

    /// Maximum acceptable average response time, milliseconds
    pub max_acceptable_response_time: f64,

    pub min_security_score: f64,

    pub min_accessibility_score: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            minimum_pass_rate: 95.0,
            max_acceptable_response_time: 3000.0,
            min_security_score: 85.0,
            min_accessibility_score: 90.0,
        }
    }
}

/// One HTTP probe run by a probe-based module
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    pub name: String,

    /// Path appended to the target base URL
    pub path: String,

    #[serde(default = "default_method")]
    pub method: String,

    /// Expected status code; any 2xx when unset
    #[serde(default)]
    pub expect_status: Option<u16>,

    /// Response headers that must be present
    #[serde(default)]
    pub required_headers: Vec<String>,

    /// Latency budget in milliseconds
    #[serde(default)]
    pub max_latency_ms: Option<u64>,

    /// Request headers sent with the probe
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default)]
    pub skip: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ProbeSpec {
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            method: default_method(),
            expect_status: None,
            required_headers: Vec::new(),
            max_latency_ms: None,
            headers: BTreeMap::new(),
            body: None,
            skip: false,
        }
    }

    /// Same probe with another HTTP method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn expect_status(mut self, status: u16) -> Self {
        self.expect_status = Some(status);
        self
    }

    pub fn require_header(mut self, header: impl Into<String>) -> Self {
        self.required_headers.push(header.into());
        self
    }

    pub fn max_latency(mut self, ms: u64) -> Self {
        self.max_latency_ms = Some(ms);
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// The deployed system under test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetConfig {
    /// Base URL of the system under test
    pub base_url: Option<String>,

    /// Path checked when connecting
    pub health_path: String,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Probes per module name
    pub probes: BTreeMap<String, Vec<ProbeSpec>>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            health_path: "/".to_string(),
            request_timeout_secs: 30,
            probes: BTreeMap::new(),
        }
    }
}

/// Suite configuration, read-only for the duration of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuiteConfig {
    pub execution_mode: ExecutionMode,

    /// Module name -> enabled
    pub enabled_modules: BTreeMap<String, bool>,

    pub execution: ExecutionSettings,

    pub quality_thresholds: QualityThresholds,

    /// Environment label recorded in result metadata
    pub environment: String,

    pub target: TargetConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::default(),
            enabled_modules: ModuleKind::all()
                .into_iter()
                .map(|kind| (kind.name().to_string(), true))
                .collect(),
            execution: ExecutionSettings::default(),
            quality_thresholds: QualityThresholds::default(),
            environment: "production".to_string(),
            target: TargetConfig::default(),
        }
    }
}

impl SuiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Enable exactly the given modules
    pub fn with_modules(mut self, kinds: &[ModuleKind]) -> Self {
        self.enabled_modules = ModuleKind::all()
            .into_iter()
            .map(|kind| (kind.name().to_string(), kinds.contains(&kind)))
            .collect();
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.execution.timeout_per_module_ms = ms;
        self
    }

    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.execution.max_parallel_tests = max;
        self
    }

    pub fn with_stop_on_first_failure(mut self, stop: bool) -> Self {
        self.execution.stop_on_first_failure = stop;
        self
    }

    pub fn with_emergency_stop(mut self, enabled: bool) -> Self {
        self.execution.emergency_stop_enabled = enabled;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.target.base_url = Some(url.into());
        self
    }

    /// Enable only the named modules (CLI `--modules`)
    pub fn enable_only<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut kinds = Vec::new();
        for name in names {
            let kind = ModuleKind::from_str(name.as_ref()).ok_or_else(|| {
                SuiteError::configuration(format!("Unknown module: {}", name.as_ref()))
            })?;
            kinds.push(kind);
        }

        self.enabled_modules = ModuleKind::all()
            .into_iter()
            .map(|kind| (kind.name().to_string(), kinds.contains(&kind)))
            .collect();
        Ok(())
    }

    /// Resolve enabled module names to kinds
    pub fn enabled_kinds(&self) -> Result<BTreeSet<ModuleKind>> {
        let mut kinds = BTreeSet::new();
        for (name, enabled) in &self.enabled_modules {
            let kind = ModuleKind::from_name(name)
                .ok_or_else(|| SuiteError::configuration(format!("Unknown module: {name}")))?;
            if *enabled {
                kinds.insert(kind);
            }
        }
        Ok(kinds)
    }

    /// Probes configured for a module
    pub fn probes_for(&self, kind: ModuleKind) -> Vec<ProbeSpec> {
        self.target
            .probes
            .iter()
            .filter(|(name, _)| ModuleKind::from_name(name) == Some(kind))
            .flat_map(|(_, probes)| probes.iter().cloned())
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.enabled_kinds()?;

        for name in self.target.probes.keys() {
            if ModuleKind::from_name(name).is_none() {
                return Err(SuiteError::configuration(format!(
                    "Probes configured for unknown module: {name}"
                )));
            }
        }

        if self.execution.max_parallel_tests == 0 {
            return Err(SuiteError::configuration(
                "maxParallelTests must be at least 1",
            ));
        }

        if self.execution.timeout_per_module_ms == 0 {
            return Err(SuiteError::configuration(
                "timeoutPerModuleMs must be greater than 0",
            ));
        }

        if let Some(url) = &self.target.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SuiteError::configuration(format!(
                    "Invalid target base URL: {url}"
                )));
            }
        }

        Ok(())
    }
}
