//! Bounded fetch pool
//!
//! A [`FetchPool`] runs one asynchronous fetch per work item with at most
//! `workers` fetches in flight. Items are dispatched in input order; each
//! successful payload is handed to a sink on the calling task as soon as
//! its fetch completes, so sinks never need synchronization.
//!
//! The first failure (fetch error, sink error or panicked task) stops
//! further dispatch. Fetches already running are drained, then the first
//! error is returned. Nothing is retried.
//!
//! ```rust,no_run
//! use eln_backup::core::pool::FetchPool;
//! use indicatif::ProgressBar;
//!
//! # async fn example() -> eln_backup::domain::Result<()> {
//! let pool = FetchPool::new(4);
//! let items = vec!["a".to_string(), "b".to_string()];
//! let mut seen = Vec::new();
//! let report = pool
//!     .run(
//!         items,
//!         |item| async move { Ok(item.len()) },
//!         |id, len| {
//!             seen.push((id.to_string(), len));
//!             Ok(())
//!         },
//!         &ProgressBar::hidden(),
//!     )
//!     .await?;
//! assert_eq!(report.completed, 2);
//! # Ok(())
//! # }
//! ```

use crate::domain::{BackupError, FileDescriptor, FileId, Result, RowId};
use crate::log_fetch_progress;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};

/// Anything the pool can dispatch
///
/// The id is used to attribute outcomes and to key the sink.
pub trait WorkItem: Send + 'static {
    fn item_id(&self) -> &str;
}

impl WorkItem for RowId {
    fn item_id(&self) -> &str {
        self.as_str()
    }
}

impl WorkItem for FileId {
    fn item_id(&self) -> &str {
        self.as_str()
    }
}

impl WorkItem for FileDescriptor {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }
}

impl WorkItem for String {
    fn item_id(&self) -> &str {
        self.as_str()
    }
}

/// Terminal outcome of one dispatched item
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub id: String,
    pub result: Result<T>,
}

/// Accounting for one pool run
///
/// `completed + failed + not_dispatched == total` once the run returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub total: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub failed: usize,
    pub not_dispatched: usize,
}

/// Fixed-size pool of concurrent fetches
#[derive(Debug, Clone, Copy)]
pub struct FetchPool {
    workers: usize,
}

impl FetchPool {
    /// Pool running at most `workers` fetches at once (minimum 1)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetch every item and feed successful payloads to `sink`
    ///
    /// `fetch` is called on the dispatching task in input order; the future
    /// it returns runs on the runtime. `sink` is called in completion order
    /// on the calling task and blocks it while it runs, so blocking file
    /// writes in a sink hold back dispatch but never a fetch in flight.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a fetch, by the sink, or by a
    /// worker task, after in-flight fetches have drained.
    pub async fn run<I, T, F, Fut, S>(
        &self,
        items: Vec<I>,
        fetch: F,
        mut sink: S,
        progress: &ProgressBar,
    ) -> Result<PoolReport>
    where
        I: WorkItem,
        T: Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        S: FnMut(&str, T) -> Result<()>,
    {
        let mut report = PoolReport {
            total: items.len(),
            ..Default::default()
        };
        progress.set_length(items.len() as u64);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut join_set: JoinSet<FetchOutcome<T>> = JoinSet::new();
        let mut pending = items.into_iter();
        let mut next = pending.next();
        let mut first_error: Option<BackupError> = None;
        // Item id of every running task, so a panicked task can be named
        let mut in_flight: HashMap<task::Id, String> = HashMap::new();

        loop {
            // Dispatch is over: drain whatever is still running
            if next.is_none() || first_error.is_some() {
                match join_set.join_next_with_id().await {
                    Some(joined) => settle(
                        joined,
                        &mut in_flight,
                        &mut sink,
                        &mut report,
                        &mut first_error,
                        progress,
                    ),
                    None => break,
                }
                continue;
            }

            tokio::select! {
                biased;

                Some(joined) = join_set.join_next_with_id(), if !join_set.is_empty() => {
                    settle(
                        joined,
                        &mut in_flight,
                        &mut sink,
                        &mut report,
                        &mut first_error,
                        progress,
                    );
                }

                permit = semaphore.clone().acquire_owned() => {
                    let permit = permit
                        .map_err(|_| BackupError::Export("Fetch pool semaphore closed".to_string()))?;
                    let Some(item) = next.take() else {
                        continue;
                    };
                    let id = item.item_id().to_string();
                    let fut = fetch(item);

                    tracing::trace!(item_id = %id, "Dispatching fetch");
                    let item_id = id.clone();
                    let handle = join_set.spawn(async move {
                        let _permit = permit;
                        FetchOutcome {
                            id,
                            result: fut.await,
                        }
                    });
                    in_flight.insert(handle.id(), item_id);
                    report.dispatched += 1;
                    next = pending.next();
                }
            }
        }

        report.not_dispatched = report.total - report.dispatched;

        match first_error {
            Some(err) => {
                tracing::warn!(
                    completed = report.completed,
                    failed = report.failed,
                    not_dispatched = report.not_dispatched,
                    "Fetch pool stopped after failure"
                );
                Err(err)
            }
            None => Ok(report),
        }
    }
}

fn settle<T, S>(
    joined: std::result::Result<(task::Id, FetchOutcome<T>), JoinError>,
    in_flight: &mut HashMap<task::Id, String>,
    sink: &mut S,
    report: &mut PoolReport,
    first_error: &mut Option<BackupError>,
    progress: &ProgressBar,
) where
    S: FnMut(&str, T) -> Result<()>,
{
    let (id, result) = match joined {
        Ok((task_id, FetchOutcome { id, result })) => {
            in_flight.remove(&task_id);
            let result = result.and_then(|value| sink(&id, value));
            (id, result)
        }
        Err(join_err) => {
            let id = in_flight
                .remove(&join_err.id())
                .unwrap_or_else(|| String::from("<unknown>"));
            let err = BackupError::Export(format!("Worker task for {id} failed: {join_err}"));
            (id, Err(err))
        }
    };

    match result {
        Ok(()) => {
            report.completed += 1;
            progress.inc(1);
            log_fetch_progress!(id, report.completed, report.total);
        }
        Err(err) => {
            report.failed += 1;
            tracing::error!(item_id = %id, error = %err, "Fetch failed");
            if first_error.is_none() {
                *first_error = Some(err);
            }
        }
    }
}
