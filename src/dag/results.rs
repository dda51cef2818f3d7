// src/dag/results.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::task::{Inputs, Payload};
use crate::types::TaskName;

/// Results of completed tasks, keyed by task name.
///
/// A failed task is stored with an absent (`None`) result so its dependents
/// still become ready and observe the failure through their inputs.
#[derive(Debug, Default, Clone)]
pub struct ResultsStore {
    entries: HashMap<TaskName, Option<Arc<Payload>>>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task's result. Each task is stored at most once; a second
    /// insert for the same name is ignored.
    pub fn insert(&mut self, name: TaskName, result: Option<Arc<Payload>>) -> bool {
        if self.entries.contains_key(&name) {
            warn!(task = %name, "result already stored; ignoring duplicate");
            return false;
        }
        debug!(task = %name, present = result.is_some(), "stored task result");
        self.entries.insert(name, result);
        true
    }

    /// Gather the results for `deps`, preserving their order.
    pub fn inputs_for(&self, deps: &[TaskName]) -> Inputs {
        Inputs::new(
            deps.iter()
                .map(|dep| (dep.clone(), self.entries.get(dep).cloned().flatten()))
                .collect(),
        )
    }

    /// `None` if the task has not completed; `Some(None)` if it failed.
    pub fn get(&self, name: &str) -> Option<Option<&Payload>> {
        self.entries.get(name).map(|r| r.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
