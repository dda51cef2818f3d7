// src/config/validate.rs

use crate::config::model::{RawWorkflowConfig, WorkflowConfig};
use crate::errors::{FlowdagError, Result};
use crate::types::WorkflowKind;

impl TryFrom<RawWorkflowConfig> for WorkflowConfig {
    type Error = crate::errors::FlowdagError;

    fn try_from(raw: RawWorkflowConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(WorkflowConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawWorkflowConfig) -> Result<()> {
    ensure_has_name(cfg)?;
    validate_requests(cfg)?;
    validate_scheduler(cfg)?;
    validate_urls(cfg)?;
    Ok(())
}

fn ensure_has_name(cfg: &RawWorkflowConfig) -> Result<()> {
    if cfg.name.trim().is_empty() {
        return Err(FlowdagError::ConfigError(
            "`name` must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_requests(cfg: &RawWorkflowConfig) -> Result<()> {
    if cfg.requests.max_concurrent_requests == 0 {
        return Err(FlowdagError::ConfigError(
            "[requests].max_concurrent_requests must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.requests.max_concurrent_multi_requests == 0 {
        return Err(FlowdagError::ConfigError(
            "[requests].max_concurrent_multi_requests must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.requests.timeout_secs == Some(0) {
        return Err(FlowdagError::ConfigError(
            "[requests].timeout_secs must be >= 1 when set (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler(cfg: &RawWorkflowConfig) -> Result<()> {
    if cfg.scheduler.max_workers == Some(0) {
        return Err(FlowdagError::ConfigError(
            "[scheduler].max_workers must be >= 1 when set (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_urls(cfg: &RawWorkflowConfig) -> Result<()> {
    let urls = [
        ("ats_url", &cfg.ats_url),
        ("resp_url", &cfg.resp_url),
        ("offer_url", &cfg.offer_url),
    ];

    for (field, url) in urls {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(FlowdagError::ConfigError(format!(
                    "`{field}` must be an http(s) URL (got '{url}')"
                )));
            }
        }
    }
    Ok(())
}

/// Check that everything `kind` needs is configured.
pub fn validate_for_workflow(cfg: &WorkflowConfig, kind: WorkflowKind) -> Result<()> {
    match kind {
        WorkflowKind::Offer => {
            cfg.csv_path()?;
            cfg.ats_url()?;
            cfg.resp_url()?;
            cfg.offer_url()?;
            cfg.result_output_path()?;
            cfg.performance_output_path()?;
        }
        WorkflowKind::Ats => {
            cfg.csv_path()?;
            cfg.ats_url()?;
            cfg.resp_url()?;
            cfg.performance_output_path()?;
        }
    }
    Ok(())
}
