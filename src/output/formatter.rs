//! Output formatters for suite results
//!
//! Provides table, JSON, and one-line summary renderings of a `SuiteResult`.

use crate::config::QualityThresholds;
use crate::models::{ModuleResult, SuiteResult};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
    minimum_pass_rate: Option<f64>,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
            minimum_pass_rate: None,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Show the configured minimum pass rate next to the quality score
    pub fn with_thresholds(mut self, thresholds: &QualityThresholds) -> Self {
        self.minimum_pass_rate = Some(thresholds.minimum_pass_rate);
        self
    }

    pub fn format_result(&self, result: &SuiteResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(result),
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Summary => self.format_summary(result),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn status(&self, success: bool) -> String {
        if success {
            self.paint("✓ PASS", "32")
        } else {
            self.paint("✗ FAIL", "31")
        }
    }

    fn format_table(&self, result: &SuiteResult) -> String {
        let overall = &result.overall;
        let mut output = String::new();

        output.push_str("\n═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " Suite Result: {}  ({} / v{})\n",
            self.status(overall.success),
            result.metadata.environment_label,
            result.metadata.suite_version
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Skip: {} | Duration: {}ms\n",
            overall.total_tests,
            overall.passed_tests,
            overall.failed_tests,
            overall.skipped_tests,
            overall.execution_time_ms
        ));

        let quality = format!("{:.1}%", overall.quality_score);
        match self.minimum_pass_rate {
            Some(minimum) => {
                let code = if overall.quality_score >= minimum {
                    "32"
                } else {
                    "33"
                };
                output.push_str(&format!(
                    " Quality Score: {} (minimum {:.1}%)\n",
                    self.paint(&quality, code),
                    minimum
                ));
            }
            None => output.push_str(&format!(" Quality Score: {quality}\n")),
        }

        output.push_str("\n Modules:\n");
        output.push_str(" ───────────────────────────────────────────────────────────\n");
        if result.modules.is_empty() {
            output.push_str("   (no modules ran)\n");
        }
        for (kind, module) in result.modules.iter() {
            output.push_str(&format!(
                "   {:15} {} {}\n",
                kind.name(),
                self.status(module.success),
                module_detail(module)
            ));
            if let Some(error) = &module.error {
                output.push_str(&format!("   {:15} {}\n", "", self.paint(error, "31")));
            }
        }

        let sections = [
            ("Critical Issues", &result.analysis.critical_issues),
            (
                "Performance Bottlenecks",
                &result.analysis.performance_bottlenecks,
            ),
            ("Security Concerns", &result.analysis.security_concerns),
            ("Recommendations", &result.analysis.recommendations),
        ];
        for (title, findings) in sections {
            if findings.is_empty() {
                continue;
            }
            output.push_str(&format!("\n {title}:\n"));
            for finding in findings {
                output.push_str(&format!("   - {finding}\n"));
            }
        }

        output
    }

    fn format_summary(&self, result: &SuiteResult) -> String {
        format!(
            "{} {}/{} passed, {} failed, {} skipped ({:.1}%) in {}ms, {} findings",
            self.status(result.overall.success),
            result.overall.passed_tests,
            result.overall.total_tests,
            result.overall.failed_tests,
            result.overall.skipped_tests,
            result.overall.quality_score,
            result.overall.execution_time_ms,
            result.analysis.finding_count()
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Counters and known metrics for one module line
fn module_detail(module: &ModuleResult) -> String {
    let mut parts = Vec::new();

    if let Some(total) = module.total_tests {
        parts.push(format!(
            "{}/{} passed",
            module.passed_tests.unwrap_or(0),
            total
        ));
        if let Some(skipped) = module.skipped_tests.filter(|s| *s > 0) {
            parts.push(format!("{skipped} skipped"));
        }
    }
    if let Some(rt) = module.response_time() {
        parts.push(format!("avg {rt:.0}ms"));
    }
    if let Some(score) = module.security_score {
        parts.push(format!("security {score:.1}"));
    }
    if let Some(score) = module.accessibility_score {
        parts.push(format!("accessibility {score:.1}"));
    }
    if let Some(duration) = module.duration_ms {
        parts.push(format!("[{duration}ms]"));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Analysis, ModuleKind, ModuleRunRecord, OverallResult, SuiteMetadata,
    };
    use chrono::Utc;

    fn sample(success: bool) -> SuiteResult {
        let modules: ModuleRunRecord = [
            (
                ModuleKind::Performance,
                ModuleResult::from_counts(3, 0, 1).with_response_time(3200.0),
            ),
            (ModuleKind::Security, ModuleResult::failure("security test timed out (10ms)")),
        ]
        .into_iter()
        .collect();

        SuiteResult {
            overall: OverallResult {
                success,
                total_tests: 4,
                passed_tests: 3,
                failed_tests: 0,
                skipped_tests: 1,
                execution_time_ms: 42,
                quality_score: 75.0,
            },
            modules,
            analysis: Analysis {
                critical_issues: vec!["security test failed".to_string()],
                performance_bottlenecks: vec!["Response time exceeds threshold".to_string()],
                ..Default::default()
            },
            metadata: SuiteMetadata {
                start_time: Utc::now(),
                end_time: Utc::now(),
                environment_label: "production".to_string(),
                suite_version: "0.1.0".to_string(),
            },
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_table_output() {
        let output = ResultFormatter::new(OutputFormat::Table)
            .no_color()
            .with_thresholds(&QualityThresholds::default())
            .format_result(&sample(false));

        assert!(output.contains("✗ FAIL"));
        assert!(output.contains("Quality Score: 75.0% (minimum 95.0%)"));
        assert!(output.contains("3/4 passed, 1 skipped, avg 3200ms"));
        assert!(output.contains("security test timed out (10ms)"));
        assert!(output.contains("Critical Issues:"));
        assert!(output.contains("   - security test failed"));
        assert!(!output.contains("Recommendations:"));
    }

    #[test]
    fn test_json_output() {
        let output = ResultFormatter::new(OutputFormat::Json).format_result(&sample(true));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["overall"]["success"], true);
        assert_eq!(value["modules"]["performance"]["metrics"]["responseTime"], 3200.0);
        assert_eq!(value["analysis"]["criticalIssues"][0], "security test failed");
    }

    #[test]
    fn test_summary_output() {
        let output = ResultFormatter::new(OutputFormat::Summary)
            .no_color()
            .format_result(&sample(true));
        assert_eq!(
            output,
            "✓ PASS 3/4 passed, 0 failed, 1 skipped (75.0%) in 42ms, 2 findings"
        );
    }
}
