// src/config/mod.rs

//! Configuration loading and validation for flowdag.
//!
//! Responsibilities:
//! - Define the file-backed data model (`model.rs`).
//! - Load a config file from disk, TOML or JSON (`loader.rs`).
//! - Validate values and per-workflow required fields (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RawWorkflowConfig, RequestSection, SchedulerSection, WorkflowConfig};
pub use validate::validate_for_workflow;
