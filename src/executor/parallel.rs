//! Chunked parallel module execution
//!
//! Modules are split into consecutive chunks. Every module of a chunk runs
//! concurrently and the chunk settles completely before the next one starts.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::execute_module;
use crate::models::{ModuleKind, ModuleRunRecord};
use crate::modules::TestModule;

/// Run modules in barrier-separated chunks of at most `chunk_size`.
///
/// Results are recorded in input order, not completion order.
pub async fn run_chunked(
    modules: &[(ModuleKind, Arc<dyn TestModule>)],
    chunk_size: usize,
    timeout: Duration,
) -> ModuleRunRecord {
    let mut record = ModuleRunRecord::new();
    let chunk_size = chunk_size.max(1);
    let total_chunks = modules.len().div_ceil(chunk_size);

    for (index, chunk) in modules.chunks(chunk_size).enumerate() {
        debug!(
            "Chunk {}/{}: {}",
            index + 1,
            total_chunks,
            chunk
                .iter()
                .map(|(kind, _)| kind.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let runs = chunk.iter().map(|(kind, module)| {
            let kind = *kind;
            let module = module.clone();
            async move { (kind, execute_module(kind, module, timeout).await) }
        });

        for (kind, result) in join_all(runs).await {
            record.insert(kind, result);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModuleResult;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tracker {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        completed: AtomicUsize,
        /// Completed count observed by each module at start
        start_marks: Mutex<Vec<usize>>,
    }

    struct Tracked {
        kind: ModuleKind,
        delay_ms: u64,
        tracker: Arc<Tracker>,
    }

    #[async_trait]
    impl TestModule for Tracked {
        fn kind(&self) -> ModuleKind {
            self.kind
        }

        async fn execute(&self) -> Result<ModuleResult> {
            let t = &self.tracker;
            t.start_marks
                .lock()
                .unwrap()
                .push(t.completed.load(Ordering::SeqCst));
            let now = t.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            t.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

            t.in_flight.fetch_sub(1, Ordering::SeqCst);
            t.completed.fetch_add(1, Ordering::SeqCst);
            Ok(ModuleResult::from_counts(1, 0, 0))
        }
    }

    fn tracked(tracker: &Arc<Tracker>) -> Vec<(ModuleKind, Arc<dyn TestModule>)> {
        ModuleKind::all()
            .into_iter()
            .enumerate()
            .map(|(i, kind)| {
                let module: Arc<dyn TestModule> = Arc::new(Tracked {
                    kind,
                    // Later modules finish first within a chunk
                    delay_ms: 70 - 10 * i as u64,
                    tracker: tracker.clone(),
                });
                (kind, module)
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_concurrency_and_chunk_count() {
        let tracker = Arc::new(Tracker::default());
        let modules = tracked(&tracker);

        let record = run_chunked(&modules, 3, Duration::from_secs(5)).await;

        assert_eq!(record.len(), 7);
        assert!(tracker.max_in_flight.load(Ordering::SeqCst) <= 3);

        // Each chunk starts after all earlier chunks completed
        let marks: BTreeSet<usize> = tracker.start_marks.lock().unwrap().iter().copied().collect();
        assert_eq!(marks, BTreeSet::from([0, 3, 6]));
        assert_eq!(marks.len(), 7usize.div_ceil(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_in_input_order() {
        let tracker = Arc::new(Tracker::default());
        let modules = tracked(&tracker);

        let record = run_chunked(&modules, 7, Duration::from_secs(5)).await;
        assert_eq!(record.kinds(), ModuleKind::all());
        assert_eq!(tracker.max_in_flight.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_runs_one_at_a_time() {
        let tracker = Arc::new(Tracker::default());
        let modules: Vec<_> = tracked(&tracker).into_iter().take(2).collect();

        let record = run_chunked(&modules, 0, Duration::from_secs(5)).await;
        assert_eq!(record.len(), 2);
        assert_eq!(tracker.max_in_flight.load(Ordering::SeqCst), 1);
    }
}
