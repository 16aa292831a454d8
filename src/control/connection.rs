//! Connection lifecycle to the system under test
//!
//! Acquired once before any module runs and released on every exit path
//! of a suite run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::config::TargetConfig;
use crate::error::SuiteError;
use crate::http::HttpClient;

/// Scoped connectivity to the system under test
#[async_trait]
pub trait Connection: Send + Sync {
    /// Establish connectivity. Failure aborts the run.
    async fn connect(&self) -> Result<()>;

    /// Tear down connectivity
    async fn disconnect(&self) -> Result<()>;
}

/// Connection verified by an HTTP health check against the target
#[derive(Debug)]
pub struct HttpConnection {
    base_url: String,
    health_path: String,
    client: HttpClient,
    connected: AtomicBool,
}

impl HttpConnection {
    pub fn new(
        base_url: impl Into<String>,
        health_path: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let client = HttpClient::with_timeout(timeout_secs)?.base_url(base_url.clone());
        Ok(Self {
            base_url,
            health_path: health_path.into(),
            client,
            connected: AtomicBool::new(false),
        })
    }

    /// Build from target configuration; a base URL is required
    pub fn from_config(target: &TargetConfig) -> crate::error::Result<Self> {
        let base_url = target.base_url.as_deref().ok_or_else(|| {
            SuiteError::configuration("No target base URL configured (use --base-url)")
        })?;

        Self::new(base_url, &target.health_path, target.request_timeout_secs)
            .map_err(|e| SuiteError::configuration(format!("{e:#}")))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn connect(&self) -> Result<()> {
        info!("Connecting to {}", self.base_url);

        let response = self
            .client
            .get(&self.health_path)
            .await
            .with_context(|| format!("Health check failed for {}", self.base_url))?;

        if !response.is_success() && !response.is_redirect() {
            anyhow::bail!(
                "Health check {}{} returned status {}",
                self.base_url.trim_end_matches('/'),
                self.health_path,
                response.status_code
            );
        }

        self.connected.store(true, Ordering::SeqCst);
        info!(
            "Connected to {} ({}ms)",
            self.base_url, response.duration_ms
        );
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!("Disconnected from {}", self.base_url);
        }
        Ok(())
    }
}
