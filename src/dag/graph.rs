// src/dag/graph.rs

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::{FlowdagError, Result};
use crate::task::Task;
use crate::types::TaskName;

/// Tasks keyed by name, in insertion order, plus their dependency edges.
///
/// Edges point from a dependency to its dependent. [`TaskGraph::add_task`]
/// only accepts dependencies that were added earlier, so a graph built
/// incrementally is acyclic by construction; [`TaskGraph::from_tasks`] lifts
/// that restriction and leaves cycle detection to [`TaskGraph::check_acyclic`].
#[derive(Debug, Default)]
pub struct TaskGraph {
    tasks: IndexMap<TaskName, Task>,
    /// Direct dependents: tasks that list the key as a dependency.
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task whose dependencies are all already present.
    ///
    /// On error the graph is left unchanged.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(task.name()) {
            return Err(FlowdagError::DuplicateTask(task.name().to_string()));
        }

        if let Some(missing) = task
            .dependencies()
            .iter()
            .find(|dep| !self.tasks.contains_key(dep.as_str()))
        {
            return Err(FlowdagError::UnknownDependency {
                task: task.name().to_string(),
                dependency: missing.clone(),
            });
        }

        self.insert(task);
        Ok(())
    }

    /// Build a graph from tasks given in any order.
    ///
    /// Duplicate names and dependencies on tasks that are not part of the set
    /// are still rejected. Cycles are not; they surface when the graph is
    /// checked before execution.
    pub fn from_tasks<I>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut graph = Self::new();
        for task in tasks {
            if graph.tasks.contains_key(task.name()) {
                return Err(FlowdagError::DuplicateTask(task.name().to_string()));
            }
            graph.insert(task);
        }

        for task in graph.tasks.values() {
            for dep in task.dependencies() {
                if !graph.tasks.contains_key(dep.as_str()) {
                    return Err(FlowdagError::UnknownDependency {
                        task: task.name().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(graph)
    }

    fn insert(&mut self, task: Task) {
        let name = task.name().to_string();
        for dep in task.dependencies() {
            self.dependents
                .entry(dep.clone())
                .or_default()
                .push(name.clone());
        }
        debug!(task = %name, deps = ?task.dependencies(), "added task to graph");
        self.tasks.insert(name, task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub(crate) fn task_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(name)
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a task, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|t| t.dependencies())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn petgraph(&self) -> DiGraphMap<&str, ()> {
        // Edge direction: dep -> task
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }
        for (name, task) in self.tasks.iter() {
            for dep in task.dependencies() {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
        graph
    }

    /// Fail with [`FlowdagError::DagCycle`] if the dependency edges form a
    /// cycle.
    pub fn check_acyclic(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    /// Task names ordered so that every task comes after its dependencies.
    pub fn topological_order(&self) -> Result<Vec<TaskName>> {
        let graph = self.petgraph();
        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
            Err(cycle) => Err(FlowdagError::DagCycle(format!(
                "cycle detected in task DAG involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
