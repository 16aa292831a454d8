//! Per-module results and the ordered run record

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::ModuleKind;

/// Module-specific metrics read by the analysis engine
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetrics {
    /// Average response time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,

    /// Requests per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<f64>,
}

/// Outcome of one module execution.
///
/// Produced by the module itself or synthesized by the execution wrapper on
/// timeout/error. When `error` is set `success` is false; counters, when
/// present, satisfy `total = passed + failed + skipped`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tests: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_tests: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_tests: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_tests: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModuleMetrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ModuleResult {
    /// Successful result without counters
    pub fn success() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Failed result carrying an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Result from test counters; successful when nothing failed
    pub fn from_counts(passed: u64, failed: u64, skipped: u64) -> Self {
        Self {
            success: failed == 0,
            total_tests: Some(passed + failed + skipped),
            passed_tests: Some(passed),
            failed_tests: Some(failed),
            skipped_tests: Some(skipped),
            ..Default::default()
        }
    }

    pub fn with_response_time(mut self, response_time_ms: f64) -> Self {
        self.metrics
            .get_or_insert_with(ModuleMetrics::default)
            .response_time = Some(response_time_ms);
        self
    }

    pub fn with_throughput(mut self, rps: f64) -> Self {
        self.metrics.get_or_insert_with(ModuleMetrics::default).throughput = Some(rps);
        self
    }

    pub fn with_security_score(mut self, score: f64) -> Self {
        self.security_score = Some(score);
        self
    }

    pub fn with_accessibility_score(mut self, score: f64) -> Self {
        self.accessibility_score = Some(score);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response_time(&self) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.response_time)
    }

    /// Check the error/success and counter conservation invariants
    pub fn is_consistent(&self) -> bool {
        if self.error.is_some() && self.success {
            return false;
        }

        match self.total_tests {
            Some(total) => {
                let sum = self.passed_tests.unwrap_or(0)
                    + self.failed_tests.unwrap_or(0)
                    + self.skipped_tests.unwrap_or(0);
                total == sum
            }
            None => true,
        }
    }
}

impl fmt::Display for ModuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.success { "PASS" } else { "FAIL" })?;
        if let Some(total) = self.total_tests {
            write!(
                f,
                " ({}/{} passed",
                self.passed_tests.unwrap_or(0),
                total
            )?;
            if let Some(skipped) = self.skipped_tests.filter(|s| *s > 0) {
                write!(f, ", {skipped} skipped")?;
            }
            write!(f, ")")?;
        }
        if let Some(error) = &self.error {
            write!(f, " - {error}")?;
        }
        Ok(())
    }
}

/// Module results keyed by module, in the order the scheduler decided to
/// run them (not completion order).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleRunRecord {
    entries: Vec<(ModuleKind, ModuleResult)>,
}

impl ModuleRunRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a module result. A second result for the same module replaces
    /// the first in place.
    pub fn insert(&mut self, kind: ModuleKind, result: ModuleResult) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((kind, result)),
        }
    }

    /// Append all entries of another record
    pub fn extend(&mut self, other: ModuleRunRecord) {
        for (kind, result) in other.entries {
            self.insert(kind, result);
        }
    }

    pub fn get(&self, kind: ModuleKind) -> Option<&ModuleResult> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| r)
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleKind, &ModuleResult)> {
        self.entries.iter().map(|(k, r)| (*k, r))
    }

    /// Module kinds in record order
    pub fn kinds(&self) -> Vec<ModuleKind> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ModuleKind, ModuleResult)> for ModuleRunRecord {
    fn from_iter<I: IntoIterator<Item = (ModuleKind, ModuleResult)>>(iter: I) -> Self {
        let mut record = ModuleRunRecord::new();
        for (kind, result) in iter {
            record.insert(kind, result);
        }
        record
    }
}

impl Serialize for ModuleRunRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, result) in &self.entries {
            map.serialize_entry(kind.name(), result)?;
        }
        map.end()
    }
}
