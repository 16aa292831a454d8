//! Final suite result and derived analysis

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::ModuleRunRecord;

/// Qualitative findings derived from module results and quality thresholds
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub critical_issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub performance_bottlenecks: Vec<String>,
    pub security_concerns: Vec<String>,
}

impl Analysis {
    /// True when no finding of any kind was produced
    pub fn is_empty(&self) -> bool {
        self.critical_issues.is_empty()
            && self.recommendations.is_empty()
            && self.performance_bottlenecks.is_empty()
            && self.security_concerns.is_empty()
    }

    pub fn finding_count(&self) -> usize {
        self.critical_issues.len()
            + self.recommendations.len()
            + self.performance_bottlenecks.len()
            + self.security_concerns.len()
    }
}

/// Suite-wide totals
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallResult {
    pub success: bool,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub skipped_tests: u64,
    pub execution_time_ms: u64,
    /// Pass rate, 0-100
    pub quality_score: f64,
}

/// Run metadata
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteMetadata {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub environment_label: String,
    pub suite_version: String,
}

/// Result of one orchestrated suite run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SuiteResult {
    pub overall: OverallResult,
    pub modules: ModuleRunRecord,
    pub analysis: Analysis,
    pub metadata: SuiteMetadata,
}

impl SuiteResult {
    /// Process exit code for this result
    pub fn exit_code(&self) -> i32 {
        if self.overall.success {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for SuiteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}/{} passed, {} failed, {} skipped, quality {:.1}% [{}ms]",
            if self.overall.success {
                "SUCCESS"
            } else {
                "FAILURE"
            },
            self.overall.passed_tests,
            self.overall.total_tests,
            self.overall.failed_tests,
            self.overall.skipped_tests,
            self.overall.quality_score,
            self.overall.execution_time_ms
        )
    }
}
