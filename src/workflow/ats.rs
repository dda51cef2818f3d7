// src/workflow/ats.rs

//! ATS workflow: extract, transform, then three prediction tasks that each
//! post one row at a time.

use crate::config::WorkflowConfig;
use crate::errors::Result;
use crate::fanout::{request_task, FanOutCaller};
use crate::task::Task;
use crate::workflow::steps::{self, ATS_PREDICT, RESP2_PREDICT, RESP_PREDICT, TRANSFORM};

pub fn tasks(config: &WorkflowConfig) -> Result<Vec<Task>> {
    let sequential = FanOutCaller::from_requests(&config.requests)?.with_max_in_flight(1);

    Ok(vec![
        steps::extract_task(config.csv_path()?.to_path_buf()),
        steps::transform_task(),
        request_task(ATS_PREDICT, config.ats_url()?, sequential.clone()).after([TRANSFORM]),
        request_task(RESP_PREDICT, config.resp_url()?, sequential.clone()).after([TRANSFORM]),
        request_task(RESP2_PREDICT, config.resp_url()?, sequential).after([TRANSFORM]),
    ])
}
