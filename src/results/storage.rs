//! Result persistence
//!
//! Writes a `SuiteResult` as pretty JSON. A directory target gets a
//! timestamped file name.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::SuiteResult;

/// Where suite results are written
#[derive(Clone, Debug)]
pub struct ResultStore {
    target: PathBuf,
}

impl ResultStore {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Store under the user data directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suite-orchestrator")
            .join("results");
        Self::new(base_dir)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Resolve the file a result will be written to
    pub fn result_path(&self, result: &SuiteResult) -> PathBuf {
        if self.target.is_dir() || self.target.extension().is_none() {
            self.target.join(file_name_for(result))
        } else {
            self.target.clone()
        }
    }

    /// Save a suite result, returning the written path
    pub fn save(&self, result: &SuiteResult) -> Result<PathBuf> {
        let path = self.result_path(result);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create results directory {}", parent.display())
                })?;
            }
        }

        let file = File::create(&path)
            .with_context(|| format!("Failed to create results file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, result).context("Failed to write results")?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush results file {}", path.display()))?;

        info!("Saved suite result to {}", path.display());
        Ok(path)
    }
}

/// `suite-result-<YYYYmmdd-HHMMSS>.json`, stamped with the run's end time
fn file_name_for(result: &SuiteResult) -> String {
    format!(
        "suite-result-{}.json",
        result.metadata.end_time.format("%Y%m%d-%H%M%S")
    )
}
