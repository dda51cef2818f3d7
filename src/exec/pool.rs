// src/exec/pool.rs

//! Bounded worker pool used by the scheduler.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error};

use crate::exec::task_runner::run_task;
use crate::task::{Inputs, Invocation, TaskReport};

/// Dispatches task invocations onto Tokio tasks.
///
/// At most `max_workers` task bodies run at once; further dispatches wait for
/// a permit inside their own Tokio task, so [`WorkerPool::dispatch`] never
/// blocks the caller. Every dispatched task sends exactly one [`TaskReport`]
/// back over the report channel, which makes the scheduler loop the single
/// writer of all shared run state.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    reports: mpsc::Sender<TaskReport>,
}

impl WorkerPool {
    pub fn new(max_workers: usize, reports: mpsc::Sender<TaskReport>) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            reports,
        }
    }

    /// Number of workers currently free.
    pub fn dispatch(&self, invocation: Invocation, inputs: Inputs) {
        let permits = Arc::clone(&self.permits);
        let reports = self.reports.clone();

        tokio::spawn(async move {
            // The semaphore is never closed, so this only fails if the pool
            // itself is being torn down; run unbounded in that case.
            let _permit = permits.acquire_owned().await.ok();
            debug!(task = %invocation.name, "worker acquired");

            let report = run_task(invocation, inputs).await;
            let name = report.name.clone();

            if let Err(err) = reports.send(report).await {
                error!(task = %name, error = %err, "scheduler dropped the report channel");
            }
        });
    }
}

/// Default worker count: the host's available parallelism.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
