// src/errors.rs

//! Crate-wide error types and aliases.

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum FlowdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task {0} already exists")]
    DuplicateTask(TaskName),

    #[error("Dependency '{dependency}' not found for task '{task}'")]
    UnknownDependency { task: TaskName, dependency: TaskName },

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Deadlock detected in task execution; blocked tasks: {0:?}")]
    Deadlock(Vec<TaskName>),

    #[error("Task graph has already been executed")]
    AlreadyExecuted,

    #[error("Dependency '{0}' produced no result")]
    MissingInput(TaskName),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single task body.
///
/// Never propagated out of the scheduler: it is recorded on the task and the
/// task's result is stored as absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task '{task}' failed: {message}")]
pub struct TaskExecutionError {
    pub task: TaskName,
    pub message: String,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FlowdagError>;
