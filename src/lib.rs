// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fanout;
pub mod logging;
pub mod pipeline;
pub mod task;
pub mod types;
pub mod workflow;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::workflow::Workflow;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the config for the selected workflow, then either
/// prints the task graph (`--dry-run`) or runs it and writes the result and
/// summary artifacts.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path, args.workflow)?;

    let mut workflow = Workflow::new(args.workflow, cfg);

    if args.dry_run {
        workflow.preload()?;
        print_dry_run(&workflow)?;
        return Ok(());
    }

    let summary = workflow.start().await?;

    let failed: Vec<&str> = summary.run.failed_tasks().collect();
    if failed.is_empty() {
        info!(workflow = %summary.name, tasks = summary.run.tasks.len(), "all tasks succeeded");
    } else {
        warn!(workflow = %summary.name, ?failed, "workflow finished with failed tasks");
    }

    Ok(())
}

/// Simple dry-run output: tasks in dependency order with their inputs.
fn print_dry_run(workflow: &Workflow) -> Result<()> {
    let graph = workflow.scheduler().graph();
    let order = graph.topological_order()?;

    println!("flowdag dry-run");
    println!("  workflow = {}", workflow.kind());
    println!("  name = {:?}", workflow.config().name);
    println!(
        "  requests.max_concurrent_requests = {}",
        workflow.config().requests.max_concurrent_requests
    );
    println!(
        "  requests.failed_call_value = {:?}",
        workflow.config().requests.failed_call_value
    );
    println!(
        "  scheduler.max_workers = {}",
        workflow.scheduler().options().max_workers
    );
    println!();

    println!("tasks ({}):", order.len());
    for name in order.iter() {
        println!("  - {name}");
        let deps = graph.dependencies_of(name);
        if !deps.is_empty() {
            println!("      after: {:?}", deps);
        }
        if let Some(task) = graph.task(name) {
            println!("      body: {:?}", task.body());
        }
    }

    debug!(tasks = order.len(), "dry-run complete (no execution)");
    Ok(())
}
