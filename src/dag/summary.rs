// src/dag/summary.rs

//! Execution summary built from per-task metrics after a run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::task::{TaskMetrics, TaskRunState};
use crate::types::TaskName;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub status: TaskStatus,
    pub execution_time_sec: Option<f64>,
    pub processed_item_count: u64,
    pub item_failure_count: u64,
    pub throughput_items_per_sec: f64,
}

impl TaskSummary {
    /// A task counts as a success only if its body returned normally,
    /// processed at least one item and had no per-item failures.
    pub fn from_metrics(metrics: &TaskMetrics) -> Self {
        let ok = metrics.state == TaskRunState::Succeeded
            && metrics.failure_count == 0
            && metrics.processed_count > 0;

        Self {
            status: if ok {
                TaskStatus::Success
            } else {
                TaskStatus::Failed
            },
            execution_time_sec: metrics.elapsed.map(|d| d.as_secs_f64()),
            processed_item_count: metrics.processed_count,
            item_failure_count: metrics.failure_count,
            throughput_items_per_sec: throughput(metrics.processed_count, metrics.elapsed),
        }
    }
}

/// Items per second; zero when the duration is zero or unknown.
pub fn throughput(items: u64, elapsed: Option<Duration>) -> f64 {
    match elapsed {
        Some(d) if !d.is_zero() => items as f64 / d.as_secs_f64(),
        _ => 0.0,
    }
}

/// Snapshot of one scheduler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Per-task entries in graph insertion order.
    pub tasks: IndexMap<TaskName, TaskSummary>,
    /// Wall-clock time of the whole `execute` call.
    pub total_execution_time_sec: Option<f64>,
    /// UTC, `%Y-%m-%d %H:%M:%S`.
    pub completion_timestamp: String,
}

impl RunSummary {
    pub fn new<'a, I>(tasks: I, total: Option<Duration>, completed_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a TaskMetrics)>,
    {
        Self {
            tasks: tasks
                .into_iter()
                .map(|(name, m)| (name.to_string(), TaskSummary::from_metrics(m)))
                .collect(),
            total_execution_time_sec: total.map(|d| d.as_secs_f64()),
            completion_timestamp: completed_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &str> {
        self.tasks
            .iter()
            .filter(|(_, t)| t.status == TaskStatus::Failed)
            .map(|(n, _)| n.as_str())
    }
}

/// The persisted summary artifact: workflow identity plus the run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub run: RunSummary,
}
