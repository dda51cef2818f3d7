// src/dag/scheduler.rs

use std::time::{Duration, Instant};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::results::ResultsStore;
use crate::dag::run_state::RunState;
use crate::dag::summary::RunSummary;
use crate::errors::{FlowdagError, Result};
use crate::exec::{default_worker_count, WorkerPool};
use crate::task::{Task, TaskReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Upper bound on task bodies running at the same time.
    pub max_workers: usize,
}

impl SchedulerOptions {
    pub fn new(max_workers: Option<usize>) -> Self {
        Self {
            max_workers: max_workers.unwrap_or_else(default_worker_count).max(1),
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Scheduler holds the task graph plus the state of its single run.
///
/// It is responsible for:
/// - rejecting duplicate names and unknown dependencies as tasks are added
/// - refusing to run a cyclic graph
/// - dispatching every task whose dependencies have completed
/// - storing each task's result and metrics as reports arrive
///
/// All run state lives on the task running [`Scheduler::execute`]; workers
/// only send [`TaskReport`]s back over a channel.
#[derive(Debug, Default)]
pub struct Scheduler {
    graph: TaskGraph,
    options: SchedulerOptions,
    results: ResultsStore,
    execution_time: Option<Duration>,
    completed_at: Option<DateTime<Utc>>,
    executed: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SchedulerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn from_graph(graph: TaskGraph, options: SchedulerOptions) -> Self {
        Self {
            graph,
            options,
            ..Self::default()
        }
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.executed {
            return Err(FlowdagError::AlreadyExecuted);
        }
        self.graph.add_task(task)
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn results(&self) -> &ResultsStore {
        &self.results
    }

    /// Wall-clock duration of the last `execute`, if it finished.
    pub fn execution_time(&self) -> Option<Duration> {
        self.execution_time
    }

    pub fn has_executed(&self) -> bool {
        self.executed
    }

    /// Run every task once, respecting dependencies.
    ///
    /// Fails before dispatching anything if the graph has a cycle. Task
    /// failures do not fail the run: the task's result is stored as absent
    /// and its dependents still run.
    pub async fn execute(&mut self) -> Result<()> {
        if self.executed {
            return Err(FlowdagError::AlreadyExecuted);
        }
        self.graph.check_acyclic()?;
        self.executed = true;

        info!(
            tasks = self.graph.len(),
            max_workers = self.options.max_workers,
            "starting DAG run"
        );
        let started = Instant::now();

        // Every task reports exactly once, so sends never wait.
        let (tx, mut rx) = mpsc::channel::<TaskReport>(self.graph.len().max(1));
        let pool = WorkerPool::new(self.options.max_workers, tx);
        let mut state = RunState::new(&self.graph);

        loop {
            for name in state.take_ready(&self.graph)? {
                let task = self.graph.task(&name).ok_or_else(|| {
                    FlowdagError::Other(anyhow!("ready task '{name}' missing from graph"))
                })?;
                let inputs = self.results.inputs_for(task.dependencies());
                pool.dispatch(task.invocation(), inputs);
            }

            if state.is_finished() {
                break;
            }

            let report = rx.recv().await.ok_or_else(|| {
                FlowdagError::Other(anyhow!("worker pool closed before all tasks reported"))
            })?;
            self.complete(report, &mut state);
        }

        let elapsed = started.elapsed();
        self.execution_time = Some(elapsed);
        self.completed_at = Some(Utc::now());

        info!(
            tasks = self.graph.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "DAG run finished"
        );
        Ok(())
    }

    fn complete(&mut self, report: TaskReport, state: &mut RunState) {
        let TaskReport {
            name,
            outcome,
            elapsed,
        } = report;

        let result = match self.graph.task_mut(&name) {
            Some(task) => task.record(outcome, elapsed),
            None => {
                warn!(task = %name, "report for unknown task");
                None
            }
        };

        self.results.insert(name.clone(), result);
        state.mark_completed(&name);
    }

    /// Per-task status, timing and throughput of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(
            self.graph.tasks().map(|t| (t.name(), t.metrics())),
            self.execution_time,
            self.completed_at.unwrap_or_else(Utc::now),
        )
    }
}
