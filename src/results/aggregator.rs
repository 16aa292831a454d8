//! Suite totals from per-module counters

use crate::models::{Analysis, ModuleRunRecord, OverallResult};

/// Sum module counters into suite totals.
///
/// Missing counters count as zero. `success` is provisional until
/// [`settle_success`] has seen the analysis; `execution_time_ms` is left
/// for the caller.
pub fn reduce(record: &ModuleRunRecord) -> OverallResult {
    let mut overall = OverallResult::default();

    for (_, result) in record.iter() {
        overall.total_tests += result.total_tests.unwrap_or(0);
        overall.passed_tests += result.passed_tests.unwrap_or(0);
        overall.failed_tests += result.failed_tests.unwrap_or(0);
        overall.skipped_tests += result.skipped_tests.unwrap_or(0);
    }

    overall.quality_score = quality_score(overall.passed_tests, overall.total_tests);
    overall.success = overall.failed_tests == 0;
    overall
}

/// Pass rate as a percentage, 0 when nothing ran
pub fn quality_score(passed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

/// Final success: no failed tests and no critical issues
pub fn settle_success(overall: &mut OverallResult, analysis: &Analysis) {
    overall.success = overall.failed_tests == 0 && analysis.critical_issues.is_empty();
}
