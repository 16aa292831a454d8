//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

use crate::config::{ExecutionMode, SuiteConfig};
use crate::error::Result;

/// Multi-module end-to-end test orchestrator
#[derive(Parser, Debug)]
#[command(name = "suite-orchestrator")]
#[command(version)]
#[command(about = "Run authentication, access, chatbot, UI, performance, security and integration test modules against a deployed system")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the test suite
    Run(RunArgs),

    /// List test modules in execution order
    List(ListArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Execution mode (sequential, parallel, hybrid)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Modules to run (comma-separated, e.g. auth,chat,perf)
    #[arg(long, value_delimiter = ',')]
    pub modules: Option<Vec<String>>,

    /// Per-module timeout in milliseconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Retry attempts for probe requests
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Chunk size in parallel mode
    #[arg(long)]
    pub max_parallel: Option<usize>,

    /// Stop sequential runs at the first failed module
    #[arg(long)]
    pub stop_on_failure: bool,

    /// Do not arm the emergency stop
    #[arg(long)]
    pub no_emergency_stop: bool,

    /// Base URL of the system under test
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Environment label recorded in results
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the result as JSON to this file or directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save the result under the user data directory
    #[arg(long, conflicts_with = "output")]
    pub save: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of file and env configuration
    pub fn apply(&self, config: &mut SuiteConfig) -> Result<()> {
        if let Some(mode) = &self.mode {
            config.execution_mode = ExecutionMode::parse(mode)?;
        }
        if let Some(modules) = &self.modules {
            config.enable_only(modules.as_slice())?;
        }
        if let Some(timeout) = self.timeout {
            config.execution.timeout_per_module_ms = timeout;
        }
        if let Some(retries) = self.retries {
            config.execution.retry_attempts = retries;
        }
        if let Some(max_parallel) = self.max_parallel {
            config.execution.max_parallel_tests = max_parallel;
        }
        if self.stop_on_failure {
            config.execution.stop_on_first_failure = true;
        }
        if self.no_emergency_stop {
            config.execution.emergency_stop_enabled = false;
        }
        if let Some(base_url) = &self.base_url {
            config.target.base_url = Some(base_url.clone());
        }
        if let Some(env) = &self.env {
            config.environment = env.clone();
        }
        Ok(())
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show phase and accepted aliases
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Print environment variable help
        #[arg(long)]
        env_help: bool,
    },

    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(default_value = "suite-orchestrator.yaml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
