// src/dag/mod.rs

//! DAG representation and scheduling.
//!
//! - [`graph`] holds the tasks and their dependency edges, and checks for
//!   cycles.
//! - [`run_state`] tracks which tasks are waiting, running and completed
//!   during a run.
//! - [`results`] stores each completed task's result by name.
//! - [`scheduler`] drives a run to completion over the worker pool.
//! - [`summary`] turns per-task metrics into the execution summary.

pub mod graph;
pub mod results;
pub mod run_state;
pub mod scheduler;
pub mod summary;

pub use graph::TaskGraph;
pub use results::ResultsStore;
pub use run_state::RunState;
pub use scheduler::{Scheduler, SchedulerOptions};
pub use summary::{ExecutionSummary, RunSummary, TaskStatus, TaskSummary};
