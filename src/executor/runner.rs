//! Module execution wrapper
//!
//! Runs one module under a deadline and folds every failure mode into a
//! failed `ModuleResult`.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::SuiteError;
use crate::models::{ModuleKind, ModuleResult};
use crate::modules::TestModule;

/// Execute a module under `timeout`.
///
/// The module runs on its own task. When the deadline passes first the task
/// is detached, not aborted: its work may still complete in the background,
/// but its result is never observed.
pub async fn execute_module(
    kind: ModuleKind,
    module: Arc<dyn TestModule>,
    timeout: Duration,
) -> ModuleResult {
    let timeout_ms = timeout.as_millis() as u64;
    let start = Instant::now();
    info!("Running {} module", kind);

    let handle = tokio::spawn(async move {
        module.initialize().await?;
        module.execute().await
    });

    let result = match tokio::time::timeout(timeout, handle).await {
        Err(_) => {
            let err = SuiteError::ModuleTimeout {
                module: kind.name().to_string(),
                timeout_ms,
            };
            warn!("{}", err);
            ModuleResult::failure(err.to_string())
        }
        Ok(Err(join_error)) => {
            let message = if join_error.is_panic() {
                format!("{kind} test panicked")
            } else {
                format!("{kind} test was cancelled")
            };
            let err = SuiteError::ModuleExecution {
                module: kind.name().to_string(),
                message,
            };
            error!("{}", err);
            ModuleResult::failure(err.to_string())
        }
        Ok(Ok(Err(e))) => {
            let err = SuiteError::ModuleExecution {
                module: kind.name().to_string(),
                message: format!("{e:#}"),
            };
            error!("{} module error: {}", kind, err);
            ModuleResult::failure(err.to_string())
        }
        Ok(Ok(Ok(result))) => {
            if !result.is_consistent() {
                warn!("{} returned an inconsistent result: {:?}", kind, result);
            }
            result
        }
    };

    debug!(
        "{} module settled in {}ms",
        kind,
        start.elapsed().as_millis()
    );
    info!("  {}: {}", kind, result);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Fixed(ModuleResult);

    #[async_trait]
    impl TestModule for Fixed {
        fn kind(&self) -> ModuleKind {
            ModuleKind::Chatbot
        }

        async fn execute(&self) -> Result<ModuleResult> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl TestModule for Failing {
        fn kind(&self) -> ModuleKind {
            ModuleKind::Security
        }

        async fn execute(&self) -> Result<ModuleResult> {
            anyhow::bail!("scanner unavailable")
        }
    }

    struct Hanging;

    #[async_trait]
    impl TestModule for Hanging {
        fn kind(&self) -> ModuleKind {
            ModuleKind::Performance
        }

        async fn execute(&self) -> Result<ModuleResult> {
            std::future::pending::<Result<ModuleResult>>().await
        }
    }

    struct Panicking;

    #[async_trait]
    impl TestModule for Panicking {
        fn kind(&self) -> ModuleKind {
            ModuleKind::UiUx
        }

        async fn execute(&self) -> Result<ModuleResult> {
            panic!("renderer crashed")
        }
    }

    /// Sleeps, then marks completion
    struct Slow {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl TestModule for Slow {
        fn kind(&self) -> ModuleKind {
            ModuleKind::Integration
        }

        async fn execute(&self) -> Result<ModuleResult> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(ModuleResult::success())
        }
    }

    struct CountingInit {
        inits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TestModule for CountingInit {
        fn kind(&self) -> ModuleKind {
            ModuleKind::Authentication
        }

        async fn initialize(&self) -> Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn execute(&self) -> Result<ModuleResult> {
            Ok(ModuleResult::from_counts(2, 0, 0))
        }
    }

    #[tokio::test]
    async fn test_result_passes_through_unchanged() {
        let expected = ModuleResult::from_counts(4, 1, 0).with_response_time(120.0);
        let result = execute_module(
            ModuleKind::Chatbot,
            Arc::new(Fixed(expected.clone())),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_error_becomes_failed_result() {
        let result =
            execute_module(ModuleKind::Security, Arc::new(Failing), Duration::from_secs(1)).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("scanner unavailable"));
    }

    #[tokio::test]
    async fn test_timeout_names_configured_duration() {
        let result = execute_module(
            ModuleKind::Performance,
            Arc::new(Hanging),
            Duration::from_millis(50),
        )
        .await;
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("50"));
        assert_eq!(error, "performance test timed out (50ms)");
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_result() {
        let result =
            execute_module(ModuleKind::UiUx, Arc::new(Panicking), Duration::from_secs(1)).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("uiUx test panicked"));
    }

    #[tokio::test]
    async fn test_timed_out_work_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let module = Slow {
            finished: finished.clone(),
        };

        let result = execute_module(
            ModuleKind::Integration,
            Arc::new(module),
            Duration::from_millis(10),
        )
        .await;
        assert!(!result.success);
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_initialize_runs_before_execute() {
        let inits = Arc::new(AtomicUsize::new(0));
        let module = CountingInit {
            inits: inits.clone(),
        };
        let result = execute_module(
            ModuleKind::Authentication,
            Arc::new(module),
            Duration::from_secs(1),
        )
        .await;
        assert!(result.success);
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }
}
