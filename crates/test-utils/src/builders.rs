#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flowdag::config::{RawWorkflowConfig, RequestSection, SchedulerSection, WorkflowConfig};
use flowdag::types::FailedCallValue;

/// Builder for `WorkflowConfig` to simplify test setup.
pub struct WorkflowConfigBuilder {
    config: RawWorkflowConfig,
}

impl WorkflowConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            config: RawWorkflowConfig {
                name: name.to_string(),
                description: String::new(),
                csv_path: None,
                result_output_path: None,
                performance_output_path: None,
                ats_url: None,
                resp_url: None,
                offer_url: None,
                requests: RequestSection::default(),
                scheduler: SchedulerSection::default(),
            },
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.config.description = description.to_string();
        self
    }

    pub fn csv_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.csv_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn result_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.result_output_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn performance_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.performance_output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Point `ats_url`, `resp_url` and `offer_url` at `base` + the usual
    /// endpoint paths.
    pub fn endpoints(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.config.ats_url = Some(format!("{base}/ml/ats/predict"));
        self.config.resp_url = Some(format!("{base}/ml/resp/predict"));
        self.config.offer_url = Some(format!("{base}/offer/assign"));
        self
    }

    /// Every input and output path placed under `dir`.
    pub fn paths_in(self, dir: &Path, csv: PathBuf) -> Self {
        self.csv_path(csv)
            .result_output_path(dir.join("result.csv"))
            .performance_output_path(dir.join("summary.json"))
    }

    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.config.requests.max_concurrent_requests = n;
        self
    }

    pub fn failed_call_value(mut self, value: FailedCallValue) -> Self {
        self.config.requests.failed_call_value = value;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.requests.timeout_secs = Some(secs);
        self
    }

    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.scheduler.max_workers = Some(n);
        self
    }

    pub fn raw(self) -> RawWorkflowConfig {
        self.config
    }

    pub fn build(self) -> WorkflowConfig {
        WorkflowConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
