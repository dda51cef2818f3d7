// src/dag/run_state.rs

//! Per-run readiness bookkeeping.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::dag::graph::TaskGraph;
use crate::errors::{FlowdagError, Result};
use crate::types::TaskName;

/// Which tasks are still waiting, which are running and which are done.
///
/// Owned by the scheduler loop; workers never touch it.
#[derive(Debug, Default)]
pub struct RunState {
    /// Not yet dispatched, in graph insertion order.
    remaining: Vec<TaskName>,
    in_flight: HashSet<TaskName>,
    completed: HashSet<TaskName>,
}

impl RunState {
    pub fn new(graph: &TaskGraph) -> Self {
        Self {
            remaining: graph.task_names().map(str::to_string).collect(),
            in_flight: HashSet::new(),
            completed: HashSet::new(),
        }
    }

    /// Take every remaining task whose dependencies have all completed and
    /// mark it in flight.
    ///
    /// Fails with [`FlowdagError::Deadlock`] when nothing is ready, nothing is
    /// running that could unblock it, and tasks are still waiting.
    pub fn take_ready(&mut self, graph: &TaskGraph) -> Result<Vec<TaskName>> {
        // Decide first, then mutate.
        let (ready, waiting): (Vec<TaskName>, Vec<TaskName>) =
            self.remaining.drain(..).partition(|name| {
                graph
                    .dependencies_of(name)
                    .iter()
                    .all(|dep| self.completed.contains(dep))
            });
        self.remaining = waiting;

        if ready.is_empty() && self.in_flight.is_empty() && !self.remaining.is_empty() {
            return Err(FlowdagError::Deadlock(self.remaining.clone()));
        }

        for name in ready.iter() {
            info!(task = %name, "dependencies satisfied; dispatching");
            self.in_flight.insert(name.clone());
        }

        Ok(ready)
    }

    pub fn mark_completed(&mut self, name: &str) {
        if self.in_flight.remove(name) {
            debug!(task = %name, "marked completed");
        }
        self.completed.insert(name.to_string());
    }

    pub fn completed(&self) -> &HashSet<TaskName> {
        &self.completed
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn remaining(&self) -> &[TaskName] {
        &self.remaining
    }

    /// Nothing waiting and nothing running.
    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty() && self.in_flight.is_empty()
    }
}
