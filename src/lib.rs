//! Suite Orchestrator - multi-module end-to-end test orchestration
//!
//! Runs independent test modules (authentication, access control, chatbot,
//! UI/UX, performance, security, integration) against a deployed system,
//! aggregates their counters and derives a risk analysis.
//!
//! ## Features
//!
//! - Sequential, parallel (bounded chunks) and hybrid (phased) scheduling
//! - Per-module timeouts that normalize every failure into a module result
//! - Cooperative emergency stop between sequential modules
//! - Connection acquired once and released on every exit path
//! - HTTP probe modules configured from YAML or JSON
//!
//! ## Usage
//!
//! ```bash
//! # Run every module in hybrid mode
//! suite-orchestrator run --base-url https://app.example.com
//!
//! # Run selected modules sequentially, stopping at the first failure
//! suite-orchestrator run --mode sequential --modules auth,access,chat --stop-on-failure
//!
//! # Write an example configuration
//! suite-orchestrator config init
//! ```

pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod executor;
pub mod http;
pub mod models;
pub mod modules;
pub mod orchestrator;
pub mod output;
pub mod results;
pub mod utils;

pub use error::{Result, SuiteError};
pub use orchestrator::SuiteOrchestrator;
