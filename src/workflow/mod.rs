// src/workflow/mod.rs

//! Fixed-shape workflows on top of the scheduler.

pub mod ats;
pub mod offer;
pub mod steps;

use std::fs;

use tracing::info;

use crate::config::WorkflowConfig;
use crate::dag::{ExecutionSummary, Scheduler, SchedulerOptions};
use crate::errors::Result;
use crate::task::Task;
use crate::types::WorkflowKind;

/// A workflow of a given kind, built lazily from its config.
///
/// The kind's tasks are added on the first [`Workflow::preload`] (or
/// [`Workflow::start`]); extra tasks may be added beforehand with
/// [`Workflow::add_task`].
#[derive(Debug)]
pub struct Workflow {
    kind: WorkflowKind,
    config: WorkflowConfig,
    scheduler: Scheduler,
    preloaded: bool,
}

impl Workflow {
    pub fn new(kind: WorkflowKind, config: WorkflowConfig) -> Self {
        let options = SchedulerOptions::new(config.scheduler.max_workers);
        Self {
            kind,
            config,
            scheduler: Scheduler::with_options(options),
            preloaded: false,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn add_task(&mut self, task: Task) -> Result<()> {
        self.scheduler.add_task(task)
    }

    /// Add this kind's tasks to the graph. Does nothing the second time.
    pub fn preload(&mut self) -> Result<()> {
        if self.preloaded {
            return Ok(());
        }

        let tasks = match self.kind {
            WorkflowKind::Offer => offer::tasks(&self.config)?,
            WorkflowKind::Ats => ats::tasks(&self.config)?,
        };
        for task in tasks {
            self.scheduler.add_task(task)?;
        }

        self.preloaded = true;
        info!(workflow = %self.config.name, kind = %self.kind, tasks = self.scheduler.graph().len(), "workflow preloaded");
        Ok(())
    }

    /// Preload, run, and write the summary to `performance_output_path`.
    ///
    /// Individual task failures still produce a summary; only graph errors
    /// and failing to write the summary are returned as errors.
    pub async fn start(&mut self) -> Result<ExecutionSummary> {
        self.preload()?;
        self.scheduler.execute().await?;
        info!(workflow = %self.config.name, "workflow completed");

        let summary = self.summary();
        self.save_summary(&summary)?;
        Ok(summary)
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            name: self.config.name.clone(),
            description: self.config.description.clone(),
            run: self.scheduler.summary(),
        }
    }

    fn save_summary(&self, summary: &ExecutionSummary) -> Result<()> {
        let path = self.config.performance_output_path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(summary)?)?;
        info!(workflow = %self.config.name, path = %path.display(), "saved workflow summary");
        Ok(())
    }
}
