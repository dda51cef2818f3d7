// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::WorkflowKind;

/// Command-line arguments for `flowdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdag",
    version,
    about = "Run a dependency-aware batch workflow and write its execution summary.",
    long_about = None
)]
pub struct CliArgs {
    /// Which workflow to run.
    #[arg(long, value_enum, value_name = "KIND", default_value_t = WorkflowKind::Offer)]
    pub workflow: WorkflowKind,

    /// Path to the config file (TOML, or JSON when it ends in `.json`).
    ///
    /// Default: `workflow.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "workflow.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task graph, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
