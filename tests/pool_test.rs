//! Integration tests for the bounded fetch pool

use eln_backup::core::pool::FetchPool;
use eln_backup::domain::{BackupError, Result};
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    async fn hold(&self, duration: Duration) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(duration).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test_case(1 ; "single worker")]
#[test_case(2 ; "two workers")]
#[test_case(8 ; "eight workers")]
#[tokio::test]
async fn test_in_flight_never_exceeds_workers(workers: usize) {
    let gauge = Arc::new(Gauge::default());
    let mut seen = 0;

    let report = FetchPool::new(workers)
        .run(
            ids(24),
            |id: String| {
                let gauge = Arc::clone(&gauge);
                async move {
                    gauge.hold(Duration::from_millis(5)).await;
                    Ok::<_, BackupError>(id)
                }
            },
            |_, _| {
                seen += 1;
                Ok(())
            },
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

    assert_eq!(seen, 24);
    assert_eq!(report.completed, 24);
    assert_eq!(report.dispatched, 24);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), workers);
}

#[tokio::test]
async fn test_dispatch_follows_input_order() {
    let dispatched = Mutex::new(Vec::new());

    FetchPool::new(2)
        .run(
            ids(6),
            |id: String| {
                dispatched.lock().unwrap().push(id.clone());
                async move { Ok::<_, BackupError>(()) }
            },
            |_, _| Ok(()),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

    assert_eq!(*dispatched.lock().unwrap(), ids(6));
}

#[tokio::test]
async fn test_sink_sees_completion_order() {
    let delays = [60u64, 30, 5];
    let items: Vec<String> = ids(3);
    let mut completed = Vec::new();

    FetchPool::new(3)
        .run(
            items,
            |id: String| {
                let index: usize = id.trim_start_matches("item-").parse().unwrap();
                let delay = Duration::from_millis(delays[index]);
                async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, BackupError>(())
                }
            },
            |id, _| {
                completed.push(id.to_string());
                Ok(())
            },
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

    assert_eq!(completed, vec!["item-2", "item-1", "item-0"]);
}

#[tokio::test]
async fn test_failure_returned_after_in_flight_fetches_drain() {
    let mut completed = Vec::new();

    let result = FetchPool::new(10)
        .run(
            ids(10),
            |id: String| async move {
                if id == "item-3" {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    return Err(BackupError::Export(format!("fetch of {id} failed")));
                }
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok(())
            },
            |id, _| {
                completed.push(id.to_string());
                Ok(())
            },
            &ProgressBar::hidden(),
        )
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("item-3"), "{err}");
    assert_eq!(completed.len(), 9);
    assert!(!completed.contains(&"item-3".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sink_runs_on_calling_thread() {
    let caller = std::thread::current().id();
    let mut sink_threads = Vec::new();

    FetchPool::new(4)
        .run(
            ids(12),
            |_id: String| async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok::<_, BackupError>(std::thread::current().id())
            },
            |_, _fetch_thread| {
                sink_threads.push(std::thread::current().id());
                Ok(())
            },
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

    assert_eq!(sink_threads.len(), 12);
    assert!(sink_threads.iter().all(|thread| *thread == caller));
}

#[tokio::test]
async fn test_failure_stops_dispatch() {
    let calls = AtomicUsize::new(0);

    let result: Result<_> = FetchPool::new(1)
        .run(
            ids(5),
            |id: String| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if id == "item-1" {
                        Err(BackupError::Export("boom".to_string()))
                    } else {
                        Ok(())
                    }
                }
            },
            |_, _| Ok(()),
            &ProgressBar::hidden(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
