//! Analysis engine
//!
//! Derives findings from a run record and the configured quality
//! thresholds. Every failed module is a critical issue; metric rules apply
//! per module kind and skip results without the metric.

use crate::config::QualityThresholds;
use crate::models::{Analysis, ModuleKind, ModuleResult, ModuleRunRecord};

type Rule = fn(&ModuleResult, &QualityThresholds, &mut Analysis);

/// Metric rules keyed by module kind
const RULES: &[(ModuleKind, Rule)] = &[
    (ModuleKind::Performance, response_time_rule),
    (ModuleKind::Security, security_score_rule),
    (ModuleKind::UiUx, accessibility_rule),
];

/// Derive findings. Pure: identical inputs give identical output.
pub fn derive(record: &ModuleRunRecord, thresholds: &QualityThresholds) -> Analysis {
    let mut analysis = Analysis::default();

    for (kind, result) in record.iter() {
        if !result.success {
            analysis
                .critical_issues
                .push(format!("{} test failed", kind.name()));
        }

        for (rule_kind, rule) in RULES {
            if *rule_kind == kind {
                rule(result, thresholds, &mut analysis);
            }
        }
    }

    analysis
}

fn response_time_rule(result: &ModuleResult, thresholds: &QualityThresholds, out: &mut Analysis) {
    if let Some(response_time) = result.response_time() {
        if response_time > thresholds.max_acceptable_response_time {
            out.performance_bottlenecks.push(format!(
                "Response time exceeds threshold: {response_time}ms (max {}ms)",
                thresholds.max_acceptable_response_time
            ));
        }
    }
}

fn security_score_rule(result: &ModuleResult, thresholds: &QualityThresholds, out: &mut Analysis) {
    if let Some(score) = result.security_score {
        if score < thresholds.min_security_score {
            out.security_concerns.push(format!(
                "Security score below threshold: {score} (min {})",
                thresholds.min_security_score
            ));
        }
    }
}

fn accessibility_rule(result: &ModuleResult, thresholds: &QualityThresholds, out: &mut Analysis) {
    if let Some(score) = result.accessibility_score {
        if score < thresholds.min_accessibility_score {
            out.recommendations.push(format!(
                "Accessibility needs improvement: {score} (min {})",
                thresholds.min_accessibility_score
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> QualityThresholds {
        QualityThresholds::default()
    }

    #[test]
    fn test_failed_modules_are_critical() {
        let record: ModuleRunRecord = [
            (ModuleKind::Authentication, ModuleResult::from_counts(3, 0, 0)),
            (ModuleKind::UiUx, ModuleResult::failure("timed out")),
            (ModuleKind::Chatbot, ModuleResult::from_counts(1, 1, 0)),
        ]
        .into_iter()
        .collect();

        let analysis = derive(&record, &thresholds());
        assert_eq!(
            analysis.critical_issues,
            vec!["uiUx test failed", "chatbot test failed"]
        );
    }

    #[test]
    fn test_metric_rules() {
        let record: ModuleRunRecord = [
            (
                ModuleKind::Performance,
                ModuleResult::from_counts(4, 0, 0).with_response_time(3500.0),
            ),
            (
                ModuleKind::Security,
                ModuleResult::from_counts(4, 0, 0).with_security_score(70.0),
            ),
            (
                ModuleKind::UiUx,
                ModuleResult::from_counts(4, 0, 0).with_accessibility_score(89.5),
            ),
        ]
        .into_iter()
        .collect();

        let analysis = derive(&record, &thresholds());
        assert!(analysis.critical_issues.is_empty());
        assert_eq!(
            analysis.performance_bottlenecks,
            vec!["Response time exceeds threshold: 3500ms (max 3000ms)"]
        );
        assert_eq!(
            analysis.security_concerns,
            vec!["Security score below threshold: 70 (min 85)"]
        );
        assert_eq!(
            analysis.recommendations,
            vec!["Accessibility needs improvement: 89.5 (min 90)"]
        );
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let record: ModuleRunRecord = [
            (
                ModuleKind::Performance,
                ModuleResult::success().with_response_time(3000.0),
            ),
            (ModuleKind::Security, ModuleResult::success().with_security_score(85.0)),
        ]
        .into_iter()
        .collect();

        assert!(derive(&record, &thresholds()).is_empty());
    }

    #[test]
    fn test_rules_only_apply_to_their_module() {
        // A security score on the chatbot module is not a security finding
        let record: ModuleRunRecord = [(
            ModuleKind::Chatbot,
            ModuleResult::success()
                .with_security_score(10.0)
                .with_response_time(99_999.0),
        )]
        .into_iter()
        .collect();

        assert!(derive(&record, &thresholds()).is_empty());
    }

    #[test]
    fn test_missing_metrics_produce_no_findings() {
        let record: ModuleRunRecord = [
            (ModuleKind::Performance, ModuleResult::success()),
            (ModuleKind::Security, ModuleResult::success()),
            (ModuleKind::UiUx, ModuleResult::success()),
        ]
        .into_iter()
        .collect();

        assert!(derive(&record, &thresholds()).is_empty());
    }

    #[test]
    fn test_derive_is_idempotent() {
        let record: ModuleRunRecord = [
            (ModuleKind::Security, ModuleResult::failure("down")),
            (
                ModuleKind::Performance,
                ModuleResult::success().with_response_time(4000.0),
            ),
        ]
        .into_iter()
        .collect();

        let first = derive(&record, &thresholds());
        let second = derive(&record, &thresholds());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
