// src/exec/task_runner.rs

//! Individual task runner.

use std::time::Instant;

use tracing::{error, info};

use crate::errors::TaskExecutionError;
use crate::task::{Inputs, Invocation, TaskBody, TaskOutcome, TaskReport};

/// Run a single task body and time it.
///
/// - Blocking bodies run on Tokio's blocking pool.
/// - Concurrent bodies run as their own Tokio task and are awaited to
///   completion.
///
/// Errors and panics from the body never escape: both become
/// `TaskOutcome::Failed`, and the elapsed time is recorded either way.
pub async fn run_task(invocation: Invocation, inputs: Inputs) -> TaskReport {
    let Invocation { name, body } = invocation;

    info!(task = %name, inputs = inputs.len(), "executing task");
    let started = Instant::now();

    let joined = match body {
        TaskBody::Blocking(f) => tokio::task::spawn_blocking(move || f(inputs)).await,
        TaskBody::Concurrent(f) => tokio::spawn(async move { f(inputs).await }).await,
    };

    let elapsed = started.elapsed();

    let outcome = match joined {
        Ok(Ok(output)) => {
            info!(
                task = %name,
                elapsed_ms = elapsed.as_millis() as u64,
                processed = output.processed_count,
                failed = output.failure_count,
                "task completed successfully"
            );
            TaskOutcome::Completed(output)
        }
        Ok(Err(err)) => {
            error!(
                task = %name,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %format!("{err:#}"),
                "task failed"
            );
            TaskOutcome::Failed(TaskExecutionError {
                task: name.clone(),
                message: format!("{err:#}"),
            })
        }
        Err(join_err) => {
            error!(
                task = %name,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %join_err,
                "task body panicked"
            );
            TaskOutcome::Failed(TaskExecutionError {
                task: name.clone(),
                message: format!("task body panicked: {join_err}"),
            })
        }
    };

    TaskReport {
        name,
        outcome,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Payload, Task, TaskOutput};

    #[tokio::test]
    async fn panicking_body_is_reported_as_failure() {
        let task = Task::blocking("panics", |_| -> anyhow::Result<TaskOutput> {
            panic!("kaboom")
        });

        let report = run_task(task.invocation(), Inputs::default()).await;

        assert_eq!(report.name, "panics");
        match report.outcome {
            TaskOutcome::Failed(err) => assert!(err.message.contains("panicked")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_body_panic_is_isolated() {
        let task = Task::concurrent("async-panics", |_| async {
            if true {
                panic!("async kaboom");
            }
            Ok::<_, anyhow::Error>(TaskOutput::new(Payload::Text(String::new()), 0, 0))
        });

        let report = run_task(task.invocation(), Inputs::default()).await;
        assert!(matches!(report.outcome, TaskOutcome::Failed(_)));
    }
}
