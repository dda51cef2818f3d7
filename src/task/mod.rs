// src/task/mod.rs

//! Units of work and the values they exchange.
//!
//! - [`definition`] holds [`Task`], its execution strategies and metrics.
//! - [`payload`] defines the result values passed between tasks.
//! - [`inputs`] delivers dependency results to a task in declaration order.

pub mod definition;
pub mod inputs;
pub mod payload;

pub use definition::{
    Invocation, Task, TaskBody, TaskMetrics, TaskOutcome, TaskOutput, TaskReport, TaskRunState,
};
pub use inputs::Inputs;
pub use payload::{Payload, Row, Table};
