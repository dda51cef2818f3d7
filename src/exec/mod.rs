// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`pool`] owns the permit-bounded worker pool that the scheduler
//!   dispatches ready tasks onto; finished tasks report back over an mpsc
//!   channel.
//! - [`task_runner`] runs one task body (blocking or concurrent), times it,
//!   and turns errors and panics into a failed outcome.

pub mod pool;
pub mod task_runner;

pub use pool::{default_worker_count, WorkerPool};
pub use task_runner::run_task;
