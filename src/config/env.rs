//! Environment variable configuration
//!
//! Provides environment variable overrides for suite configuration.

use std::env;

use super::{ExecutionMode, SuiteConfig};
use crate::error::{Result, SuiteError};

/// Environment variable prefix
const ENV_PREFIX: &str = "SUITE_ORCHESTRATOR";

/// Overrides read from SUITE_ORCHESTRATOR_* variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Execution mode from SUITE_ORCHESTRATOR_MODE
    pub mode: Option<String>,
    /// Module timeout from SUITE_ORCHESTRATOR_TIMEOUT_MS
    pub timeout_ms: Option<u64>,
    /// Chunk size from SUITE_ORCHESTRATOR_MAX_PARALLEL
    pub max_parallel: Option<usize>,
    /// Retry budget from SUITE_ORCHESTRATOR_RETRIES
    pub retries: Option<u32>,
    /// From SUITE_ORCHESTRATOR_STOP_ON_FAILURE
    pub stop_on_failure: Option<bool>,
    /// From SUITE_ORCHESTRATOR_EMERGENCY_STOP
    pub emergency_stop: Option<bool>,
    /// Target base URL from SUITE_ORCHESTRATOR_BASE_URL
    pub base_url: Option<String>,
    /// Environment label from SUITE_ORCHESTRATOR_ENV
    pub environment: Option<String>,
    /// Config file from SUITE_ORCHESTRATOR_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    ///
    /// A numeric variable that does not parse is a configuration error.
    pub fn load() -> Result<Self> {
        Ok(Self {
            mode: get_env("MODE"),
            timeout_ms: get_env_parse("TIMEOUT_MS")?,
            max_parallel: get_env_parse("MAX_PARALLEL")?,
            retries: get_env_parse("RETRIES")?,
            stop_on_failure: get_env_bool("STOP_ON_FAILURE"),
            emergency_stop: get_env_bool("EMERGENCY_STOP"),
            base_url: get_env("BASE_URL"),
            environment: get_env("ENV"),
            config_file: get_env("CONFIG"),
        })
    }

    /// Apply overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut SuiteConfig) -> Result<()> {
        if let Some(mode) = &self.mode {
            config.execution_mode = ExecutionMode::parse(mode)?;
        }
        if let Some(ms) = self.timeout_ms {
            config.execution.timeout_per_module_ms = ms;
        }
        if let Some(max) = self.max_parallel {
            config.execution.max_parallel_tests = max;
        }
        if let Some(retries) = self.retries {
            config.execution.retry_attempts = retries;
        }
        if let Some(stop) = self.stop_on_failure {
            config.execution.stop_on_first_failure = stop;
        }
        if let Some(enabled) = self.emergency_stop {
            config.execution.emergency_stop_enabled = enabled;
        }
        if let Some(url) = &self.base_url {
            config.target.base_url = Some(url.clone());
        }
        if let Some(label) = &self.environment {
            config.environment = label.clone();
        }
        Ok(())
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match get_env(name) {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            SuiteError::configuration(format!("Invalid {ENV_PREFIX}_{name}: {value}"))
        }),
        None => Ok(None),
    }
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all SUITE_ORCHESTRATOR environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_MODE             Execution mode (sequential, parallel, hybrid)");
    println!("  {ENV_PREFIX}_TIMEOUT_MS       Per-module timeout in milliseconds");
    println!("  {ENV_PREFIX}_MAX_PARALLEL     Parallel chunk size");
    println!("  {ENV_PREFIX}_RETRIES          Retry attempts for module probes");
    println!("  {ENV_PREFIX}_STOP_ON_FAILURE  Stop sequential runs at first failure (true/false)");
    println!("  {ENV_PREFIX}_EMERGENCY_STOP   Arm emergency stop (true/false)");
    println!("  {ENV_PREFIX}_BASE_URL         Base URL of the system under test");
    println!("  {ENV_PREFIX}_ENV              Environment label for result metadata");
    println!("  {ENV_PREFIX}_CONFIG           Path to configuration file");
}
