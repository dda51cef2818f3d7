// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{FlowdagError, Result};
use crate::types::FailedCallValue;

/// Workflow configuration as read from TOML (or JSON).
///
/// ```toml
/// name = "offer-workflow"
/// description = "Offer recommendation batch"
/// csv_path = "data/members.csv"
/// result_output_path = "out/result.csv"
/// performance_output_path = "out/summary.json"
/// ats_url = "http://localhost:8000/ml/ats/predict"
/// resp_url = "http://localhost:8000/ml/resp/predict"
/// offer_url = "http://localhost:8000/offer/assign"
///
/// [requests]
/// max_concurrent_requests = 100
/// failed_call_value = "null"
///
/// [scheduler]
/// max_workers = 8
/// ```
///
/// Which of the optional paths and URLs are required depends on the workflow
/// kind; see `config::validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkflowConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    #[serde(default)]
    pub result_output_path: Option<PathBuf>,

    #[serde(default)]
    pub performance_output_path: Option<PathBuf>,

    #[serde(default)]
    pub ats_url: Option<String>,

    #[serde(default)]
    pub resp_url: Option<String>,

    #[serde(default)]
    pub offer_url: Option<String>,

    #[serde(default)]
    pub requests: RequestSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,
}

/// Validated configuration. Build it with `WorkflowConfig::try_from`.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub name: String,
    pub description: String,
    pub csv_path: Option<PathBuf>,
    pub result_output_path: Option<PathBuf>,
    pub performance_output_path: Option<PathBuf>,
    pub ats_url: Option<String>,
    pub resp_url: Option<String>,
    pub offer_url: Option<String>,
    pub requests: RequestSection,
    pub scheduler: SchedulerSection,
}

impl WorkflowConfig {
    pub(crate) fn new_unchecked(raw: RawWorkflowConfig) -> Self {
        let RawWorkflowConfig {
            name,
            description,
            csv_path,
            result_output_path,
            performance_output_path,
            ats_url,
            resp_url,
            offer_url,
            requests,
            scheduler,
        } = raw;

        Self {
            name,
            description,
            csv_path,
            result_output_path,
            performance_output_path,
            ats_url,
            resp_url,
            offer_url,
            requests,
            scheduler,
        }
    }

    pub fn csv_path(&self) -> Result<&Path> {
        required(self.csv_path.as_deref(), "csv_path")
    }

    pub fn result_output_path(&self) -> Result<&Path> {
        required(self.result_output_path.as_deref(), "result_output_path")
    }

    pub fn performance_output_path(&self) -> Result<&Path> {
        required(self.performance_output_path.as_deref(), "performance_output_path")
    }

    pub fn ats_url(&self) -> Result<&str> {
        required(self.ats_url.as_deref(), "ats_url")
    }

    pub fn resp_url(&self) -> Result<&str> {
        required(self.resp_url.as_deref(), "resp_url")
    }

    pub fn offer_url(&self) -> Result<&str> {
        required(self.offer_url.as_deref(), "offer_url")
    }
}

fn required<'a, T: ?Sized>(value: Option<&'a T>, field: &str) -> Result<&'a T> {
    value.ok_or_else(|| FlowdagError::ConfigError(format!("`{field}` is required")))
}

/// `[requests]` section: remote fan-out behaviour.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RequestSection {
    /// Cap on in-flight calls of a single-endpoint request task.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Cap on in-flight calls of a multi-endpoint request task.
    #[serde(default = "default_max_concurrent_multi_requests")]
    pub max_concurrent_multi_requests: usize,

    /// What a failed call contributes to the results: `"null"` or `"error"`.
    #[serde(default)]
    pub failed_call_value: FailedCallValue,

    /// Per-call timeout in seconds. Unset means calls may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_max_concurrent_requests() -> usize {
    100
}

fn default_max_concurrent_multi_requests() -> usize {
    1000
}

impl RequestSection {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            max_concurrent_multi_requests: default_max_concurrent_multi_requests(),
            failed_call_value: FailedCallValue::default(),
            timeout_secs: None,
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct SchedulerSection {
    /// Maximum task bodies running at once; host parallelism if unset.
    #[serde(default)]
    pub max_workers: Option<usize>,
}
