// src/workflow/offer.rs

//! Offer workflow: seven tasks.
//!
//! ```text
//! Extract -> Transform -+-> ATS Predict  -+-> ATS-RESP Combiner -> Offer Recommendation
//!                       |                 |                                |
//!                       +-> RESP Predict -+                                |
//!                       |                                                  v
//!                       +---------------------- (all of the above) ----> Load
//! ```

use crate::config::WorkflowConfig;
use crate::errors::Result;
use crate::fanout::{request_task, FanOutCaller};
use crate::task::Task;
use crate::workflow::steps::{
    self, ATS_PREDICT, COMBINER, OFFER_RECOMMENDATION, RESP_PREDICT, TRANSFORM,
};

pub fn tasks(config: &WorkflowConfig) -> Result<Vec<Task>> {
    let caller = FanOutCaller::from_requests(&config.requests)?;

    Ok(vec![
        steps::extract_task(config.csv_path()?.to_path_buf()),
        steps::transform_task(),
        request_task(ATS_PREDICT, config.ats_url()?, caller.clone()).after([TRANSFORM]),
        request_task(RESP_PREDICT, config.resp_url()?, caller.clone()).after([TRANSFORM]),
        steps::combiner_task(),
        request_task(OFFER_RECOMMENDATION, config.offer_url()?, caller).after([COMBINER]),
        steps::load_task(config.result_output_path()?.to_path_buf()),
    ])
}
