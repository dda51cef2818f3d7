// src/task/definition.rs

//! Task definition, execution strategies and per-run metrics.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

use crate::errors::TaskExecutionError;
use crate::exec::task_runner::run_task;
use crate::task::inputs::Inputs;
use crate::task::payload::Payload;
use crate::types::TaskName;

/// What a task function hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub payload: Payload,
    /// Number of items the task processed.
    pub processed_count: u64,
    /// Number of items that failed inside an otherwise successful task.
    pub failure_count: u64,
}

impl TaskOutput {
    pub fn new(payload: Payload, processed_count: u64, failure_count: u64) -> Self {
        Self {
            payload,
            processed_count,
            failure_count,
        }
    }
}

pub type BlockingFn = dyn Fn(Inputs) -> anyhow::Result<TaskOutput> + Send + Sync;
pub type ConcurrentFn =
    dyn Fn(Inputs) -> BoxFuture<'static, anyhow::Result<TaskOutput>> + Send + Sync;

/// Execution strategy of a task.
#[derive(Clone)]
pub enum TaskBody {
    /// Runs to completion on a blocking worker thread.
    Blocking(Arc<BlockingFn>),
    /// Drives an internally concurrent future to completion.
    Concurrent(Arc<ConcurrentFn>),
}

impl fmt::Debug for TaskBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskBody::Blocking(_) => f.write_str("Blocking"),
            TaskBody::Concurrent(_) => f.write_str("Concurrent"),
        }
    }
}

/// Outcome of one execution of a task body.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(TaskOutput),
    Failed(TaskExecutionError),
}

/// Sent back to the scheduler by a worker once a task finishes.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub name: TaskName,
    pub outcome: TaskOutcome,
    pub elapsed: Duration,
}

/// Owned handle on everything a worker needs to run a task.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub name: TaskName,
    pub body: TaskBody,
}

/// Terminal state of a task in the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskRunState {
    #[default]
    NotRun,
    Succeeded,
    Failed,
}

/// Metrics recorded after the task ran.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskMetrics {
    pub state: TaskRunState,
    pub elapsed: Option<Duration>,
    pub processed_count: u64,
    pub failure_count: u64,
    pub last_error: Option<String>,
}

/// A named unit of work with declared upstream dependencies.
#[derive(Debug)]
pub struct Task {
    name: TaskName,
    dependencies: Vec<TaskName>,
    body: TaskBody,
    metrics: TaskMetrics,
}

impl Task {
    /// Task whose function runs synchronously on a worker thread.
    pub fn blocking<F>(name: impl Into<TaskName>, f: F) -> Self
    where
        F: Fn(Inputs) -> anyhow::Result<TaskOutput> + Send + Sync + 'static,
    {
        Self::with_body(name.into(), TaskBody::Blocking(Arc::new(f)))
    }

    /// Task whose function performs concurrent work internally (e.g. network
    /// fan-out). The task completes once the returned future resolves.
    pub fn concurrent<F, Fut>(name: impl Into<TaskName>, f: F) -> Self
    where
        F: Fn(Inputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<TaskOutput>> + Send + 'static,
    {
        let body: Arc<ConcurrentFn> = Arc::new(move |inputs| Box::pin(f(inputs)));
        Self::with_body(name.into(), TaskBody::Concurrent(body))
    }

    fn with_body(name: TaskName, body: TaskBody) -> Self {
        Self {
            name,
            dependencies: Vec::new(),
            body,
            metrics: TaskMetrics::default(),
        }
    }

    /// Declare dependencies. Results are delivered in this order.
    pub fn after<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[TaskName] {
        &self.dependencies
    }

    pub fn body(&self) -> &TaskBody {
        &self.body
    }

    pub fn metrics(&self) -> &TaskMetrics {
        &self.metrics
    }

    pub fn invocation(&self) -> Invocation {
        Invocation {
            name: self.name.clone(),
            body: self.body.clone(),
        }
    }

    /// Run the task body directly and record its metrics.
    ///
    /// Returns the payload, or `None` if the body failed.
    pub async fn execute(&mut self, inputs: Inputs) -> Option<Arc<Payload>> {
        let report = run_task(self.invocation(), inputs).await;
        self.record(report.outcome, report.elapsed)
    }

    /// Store the outcome of a run on this task.
    ///
    /// Elapsed time is always recorded. Counts are only replaced on success;
    /// a failed run leaves them at their previous values.
    pub fn record(&mut self, outcome: TaskOutcome, elapsed: Duration) -> Option<Arc<Payload>> {
        self.metrics.elapsed = Some(elapsed);
        match outcome {
            TaskOutcome::Completed(output) => {
                self.metrics.state = TaskRunState::Succeeded;
                self.metrics.processed_count = output.processed_count;
                self.metrics.failure_count = output.failure_count;
                self.metrics.last_error = None;
                debug!(
                    task = %self.name,
                    processed = output.processed_count,
                    failed = output.failure_count,
                    "recorded task output"
                );
                Some(Arc::new(output.payload))
            }
            TaskOutcome::Failed(err) => {
                self.metrics.state = TaskRunState::Failed;
                self.metrics.last_error = Some(err.message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn blocking_task_records_counts_and_duration() {
        let mut task = Task::blocking("count", |_| {
            Ok(TaskOutput::new(Payload::Text("done".into()), 3, 1))
        });

        let result = task.execute(Inputs::default()).await;

        assert_eq!(result.unwrap().as_text(), Some("done"));
        let m = task.metrics();
        assert_eq!(m.state, TaskRunState::Succeeded);
        assert_eq!(m.processed_count, 3);
        assert_eq!(m.failure_count, 1);
        assert!(m.elapsed.is_some());
    }

    #[tokio::test]
    async fn failing_task_yields_absent_result_without_panicking() {
        let mut task = Task::blocking("boom", |_| Err(anyhow!("bad input")));

        let result = task.execute(Inputs::default()).await;

        assert!(result.is_none());
        let m = task.metrics();
        assert_eq!(m.state, TaskRunState::Failed);
        assert_eq!(m.processed_count, 0);
        assert!(m.elapsed.is_some());
        assert!(m.last_error.as_deref().unwrap_or_default().contains("bad input"));
    }

    #[tokio::test]
    async fn concurrent_task_awaits_inner_work() {
        let mut task = Task::concurrent("inner", |_| async {
            let handles: Vec<_> = (0..4u64)
                .map(|i| tokio::spawn(async move { i * 2 }))
                .collect();
            let mut total = 0;
            for h in handles {
                total += h.await?;
            }
            Ok::<_, anyhow::Error>(TaskOutput::new(Payload::Text(total.to_string()), 4, 0))
        });

        let result = task.execute(Inputs::default()).await;
        assert_eq!(result.unwrap().as_text(), Some("12"));
    }

    #[test]
    fn failed_record_keeps_previous_counts() {
        let mut task = Task::blocking("t", |_| Ok(TaskOutput::new(Payload::Text(String::new()), 0, 0)));
        task.record(
            TaskOutcome::Completed(TaskOutput::new(Payload::Text("x".into()), 5, 2)),
            Duration::from_millis(5),
        );
        task.record(
            TaskOutcome::Failed(TaskExecutionError {
                task: "t".into(),
                message: "later failure".into(),
            }),
            Duration::from_millis(7),
        );

        let m = task.metrics();
        assert_eq!(m.processed_count, 5);
        assert_eq!(m.failure_count, 2);
        assert_eq!(m.elapsed, Some(Duration::from_millis(7)));
        assert_eq!(m.state, TaskRunState::Failed);
    }
}
