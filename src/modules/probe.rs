//! HTTP probe based test module
//!
//! Runs a list of HTTP probes against the system under test. Each probe is
//! one test; the retry budget applies to transport failures only.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::TestModule;
use crate::config::ProbeSpec;
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::models::{ModuleKind, ModuleResult};

const RETRY_BACKOFF_MS: u64 = 200;

/// Outcome of a single probe
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeOutcome {
    Pass {
        name: String,
        #[serde(rename = "latencyMs")]
        latency_ms: u64,
    },
    Fail {
        name: String,
        reason: String,
        #[serde(rename = "latencyMs", skip_serializing_if = "Option::is_none")]
        latency_ms: Option<u64>,
    },
    Skip {
        name: String,
    },
}

impl ProbeOutcome {
    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            ProbeOutcome::Pass { latency_ms, .. } => Some(*latency_ms),
            ProbeOutcome::Fail { latency_ms, .. } => *latency_ms,
            ProbeOutcome::Skip { .. } => None,
        }
    }
}

/// Test module backed by HTTP probes
#[derive(Clone, Debug)]
pub struct ProbeModule {
    kind: ModuleKind,
    client: HttpClient,
    probes: Vec<ProbeSpec>,
    retry_attempts: u32,
}

impl ProbeModule {
    pub fn new(
        kind: ModuleKind,
        base_url: &str,
        timeout_secs: u64,
        probes: Vec<ProbeSpec>,
    ) -> Result<Self> {
        let client = HttpClient::with_timeout(timeout_secs)?.base_url(base_url);
        Ok(Self {
            kind,
            client,
            probes,
            retry_attempts: 0,
        })
    }

    pub fn with_retries(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Send a probe request, retrying transient transport errors
    async fn send_with_retry(&self, probe: &ProbeSpec) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            let request = build_request(probe);
            match self.client.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let transient = e
                        .downcast_ref::<HttpError>()
                        .map(HttpError::is_transient)
                        .unwrap_or(false);

                    if !transient || attempt >= self.retry_attempts {
                        return Err(e);
                    }

                    attempt += 1;
                    debug!(
                        "Probe '{}' failed ({}), retry {}/{}",
                        probe.name, e, attempt, self.retry_attempts
                    );
                    sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                }
            }
        }
    }

    /// Run one probe
    pub async fn run_probe(&self, probe: &ProbeSpec) -> ProbeOutcome {
        if probe.skip {
            return ProbeOutcome::Skip {
                name: probe.name.clone(),
            };
        }

        let response = match self.send_with_retry(probe).await {
            Ok(response) => response,
            Err(e) => {
                return ProbeOutcome::Fail {
                    name: probe.name.clone(),
                    reason: e.to_string(),
                    latency_ms: None,
                }
            }
        };

        match check_response(probe, &response) {
            None => ProbeOutcome::Pass {
                name: probe.name.clone(),
                latency_ms: response.duration_ms,
            },
            Some(reason) => ProbeOutcome::Fail {
                name: probe.name.clone(),
                reason,
                latency_ms: Some(response.duration_ms),
            },
        }
    }
}

fn build_request(probe: &ProbeSpec) -> HttpRequest {
    let mut request = HttpRequest::new(probe.method.clone(), probe.path.clone());
    for (key, value) in &probe.headers {
        request = request.header(key.clone(), value.clone());
    }
    if let Some(body) = &probe.body {
        request = request.body(body.clone());
    }
    request
}

/// Failure reason for a response, if any
fn check_response(probe: &ProbeSpec, response: &HttpResponse) -> Option<String> {
    let status_ok = match probe.expect_status {
        Some(expected) => response.status_code == expected,
        None => response.is_success(),
    };
    if !status_ok {
        return Some(match probe.expect_status {
            Some(expected) => format!(
                "expected status {} but got {}",
                expected, response.status_code
            ),
            None => format!("expected 2xx but got {}", response.status_code),
        });
    }

    let missing: Vec<_> = probe
        .required_headers
        .iter()
        .filter(|h| !response.has_header(h))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Some(format!("missing headers: {}", missing.join(", ")));
    }

    if let Some(max) = probe.max_latency_ms {
        if response.duration_ms > max {
            return Some(format!(
                "latency {}ms exceeds {}ms",
                response.duration_ms, max
            ));
        }
    }

    None
}

#[async_trait]
impl TestModule for ProbeModule {
    fn kind(&self) -> ModuleKind {
        self.kind
    }

    async fn execute(&self) -> Result<ModuleResult> {
        if self.probes.is_empty() {
            warn!("No probes configured for {}", self.kind);
        }

        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let outcome = self.run_probe(probe).await;
            debug!("{} probe {:?}", self.kind, outcome);
            outcomes.push(outcome);
        }

        let passed = outcomes
            .iter()
            .filter(|o| matches!(o, ProbeOutcome::Pass { .. }))
            .count() as u64;
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, ProbeOutcome::Fail { .. }))
            .count() as u64;
        let skipped = outcomes
            .iter()
            .filter(|o| matches!(o, ProbeOutcome::Skip { .. }))
            .count() as u64;

        let elapsed = start.elapsed();
        let mut result = ModuleResult::from_counts(passed, failed, skipped)
            .with_duration(elapsed.as_millis() as u64)
            .with_details(serde_json::to_value(&outcomes)?);

        let executed = passed + failed;
        if executed > 0 && elapsed.as_secs_f64() > 0.0 {
            result = result.with_throughput(executed as f64 / elapsed.as_secs_f64());
        }

        let latencies: Vec<u64> = outcomes.iter().filter_map(|o| o.latency_ms()).collect();
        if !latencies.is_empty() {
            let mean = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;
            result = result.with_response_time(mean);
        }

        if executed > 0 {
            let score = passed as f64 / executed as f64 * 100.0;
            match self.kind {
                ModuleKind::Security => result = result.with_security_score(score),
                ModuleKind::UiUx => result = result.with_accessibility_score(score),
                _ => {}
            }
        }

        info!(
            "{} probes: {} passed, {} failed, {} skipped",
            self.kind, passed, failed, skipped
        );

        Ok(result)
    }
}
