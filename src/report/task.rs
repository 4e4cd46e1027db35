//! Background execution of report runs
//!
//! Runs are submitted to a small rayon pool so the caller's thread only waits
//! for the completion signal (a tokio oneshot) or polls progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error};

use super::error::{ReportError, ReportResult};

/// Task-level failures, distinct from a user cancelling the run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The worker stopped before reporting a result (it panicked)
    #[error("report task was interrupted before it completed")]
    Interrupted,
}

/// Shared cancellation request for a whole task
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a submitted task
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<T>,
    cancel: CancelFlag,
}

impl<T> TaskHandle<T> {
    /// Ask the task to stop at its next poll point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Block the current thread until the task finishes
    ///
    /// Must not be called from inside an async runtime; use [`join`](Self::join).
    pub fn wait(self) -> Result<T, TaskError> {
        self.receiver.blocking_recv().map_err(|_| TaskError::Interrupted)
    }

    pub async fn join(self) -> Result<T, TaskError> {
        self.receiver.await.map_err(|_| TaskError::Interrupted)
    }
}

pub struct ReportWorkerPool {
    pool: rayon::ThreadPool,
}

impl ReportWorkerPool {
    pub fn new(threads: usize) -> ReportResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("report-worker-{}", i))
            .panic_handler(|_| error!("Report worker panicked"))
            .build()
            .map_err(|e| ReportError::Config(format!("failed to start report workers: {}", e)))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` on a worker thread
    pub fn submit<T, F>(&self, job: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelFlag) -> T + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let cancel = CancelFlag::new();
        let task_cancel = cancel.clone();

        self.pool.spawn(move || {
            let result = job(&task_cancel);
            if sender.send(result).is_err() {
                debug!("Report task finished after its handle was dropped");
            }
        });

        TaskHandle { receiver, cancel }
    }
}
