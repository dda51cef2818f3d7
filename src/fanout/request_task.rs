// src/fanout/request_task.rs

//! Tasks that post their first input, row by row, to remote endpoints.

use std::sync::Arc;

use crate::fanout::caller::FanOutCaller;
use crate::task::{Payload, Task, TaskOutput};
use crate::types::TaskName;

/// Task that posts each row of its first input to `endpoint`.
///
/// Produces a value list aligned with the input rows. Every row counts as
/// processed; failed calls are reported in the failure count.
pub fn request_task(
    name: impl Into<TaskName>,
    endpoint: impl Into<String>,
    caller: FanOutCaller,
) -> Task {
    let endpoint: Arc<str> = Arc::from(endpoint.into());
    let caller = Arc::new(caller);

    Task::concurrent(name, move |inputs| {
        let caller = Arc::clone(&caller);
        let endpoint = Arc::clone(&endpoint);
        async move {
            let rows = inputs.require(0)?.to_rows()?;
            let batch = caller.call_rows(&endpoint, &rows).await;
            let processed = batch.results.len() as u64;
            Ok::<_, anyhow::Error>(TaskOutput::new(
                Payload::Values(batch.results),
                processed,
                batch.failures,
            ))
        }
    })
}

/// Task that posts each row of its first input to every endpoint.
///
/// Each output entry is an array with one result per endpoint.
pub fn multi_request_task(
    name: impl Into<TaskName>,
    endpoints: Vec<String>,
    caller: FanOutCaller,
) -> Task {
    let endpoints: Arc<[String]> = Arc::from(endpoints);
    let caller = Arc::new(caller);

    Task::concurrent(name, move |inputs| {
        let caller = Arc::clone(&caller);
        let endpoints = Arc::clone(&endpoints);
        async move {
            let rows = inputs.require(0)?.to_rows()?;
            let batch = caller.call_rows_multi(&endpoints, &rows).await;
            let processed = batch.results.len() as u64;
            Ok::<_, anyhow::Error>(TaskOutput::new(
                Payload::Values(batch.results),
                processed,
                batch.failures,
            ))
        }
    })
}
