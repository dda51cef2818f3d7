// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{RawWorkflowConfig, WorkflowConfig};
use crate::config::validate::validate_for_workflow;
use crate::errors::Result;
use crate::types::WorkflowKind;

/// Load a configuration file without semantic validation.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWorkflowConfig = if is_json(path) {
        serde_json::from_str(&contents)?
    } else {
        toml::from_str(&contents)?
    };

    debug!(path = %path.display(), name = %config.name, "loaded config file");
    Ok(config)
}

/// Load, validate, and check that everything `kind` needs is present.
pub fn load_and_validate(path: impl AsRef<Path>, kind: WorkflowKind) -> Result<WorkflowConfig> {
    let raw_config = load_from_path(&path)?;
    let config = WorkflowConfig::try_from(raw_config)?;
    validate_for_workflow(&config, kind)?;
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
