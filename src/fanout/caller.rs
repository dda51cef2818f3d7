// src/fanout/caller.rs

//! Bounded concurrent POST fan-out, one call per row.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::RequestSection;
use crate::errors::{FlowdagError, Result};
use crate::task::Row;
use crate::types::FailedCallValue;

/// Failure of one remote call. Counted and logged, never propagated.
#[derive(Error, Debug)]
pub enum RemoteCallError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned no value")]
    EmptyResponse { endpoint: String },
}

/// Output of one fan-out batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutBatch {
    /// `results[i]` belongs to input row `i`.
    pub results: Vec<Value>,
    /// Number of calls that failed and were replaced by the sentinel.
    pub failures: u64,
}

/// Posts rows to remote endpoints with at most `max_in_flight` calls
/// outstanding at once.
///
/// Each endpoint is expected to answer with a single-key JSON object; the
/// value under that key is the row's result. A failed call yields the
/// configured sentinel in place of a result and bumps the failure count, and
/// never affects the other rows. No retries.
#[derive(Debug, Clone)]
pub struct FanOutCaller {
    client: Client,
    max_in_flight: usize,
    failed_value: FailedCallValue,
}

impl FanOutCaller {
    pub fn new(
        max_in_flight: usize,
        failed_value: FailedCallValue,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            FlowdagError::ConfigError(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_client(client, max_in_flight, failed_value))
    }

    pub fn with_client(client: Client, max_in_flight: usize, failed_value: FailedCallValue) -> Self {
        Self {
            client,
            max_in_flight: max_in_flight.max(1),
            failed_value,
        }
    }

    /// Caller for single-endpoint request tasks, capped by
    /// `max_concurrent_requests`.
    pub fn from_requests(requests: &RequestSection) -> Result<Self> {
        Self::new(
            requests.max_concurrent_requests,
            requests.failed_call_value,
            requests.timeout(),
        )
    }

    /// Caller for multi-endpoint request tasks, capped by
    /// `max_concurrent_multi_requests`.
    pub fn multi_from(requests: &RequestSection) -> Result<Self> {
        Self::new(
            requests.max_concurrent_multi_requests,
            requests.failed_call_value,
            requests.timeout(),
        )
    }

    /// Same client and sentinel policy, different cap.
    pub fn with_max_in_flight(&self, max_in_flight: usize) -> Self {
        Self::with_client(self.client.clone(), max_in_flight, self.failed_value)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn failed_value(&self) -> FailedCallValue {
        self.failed_value
    }

    /// POST every row to `endpoint`.
    pub async fn call_rows(&self, endpoint: &str, rows: &[Row]) -> FanOutBatch {
        let permits = Semaphore::new(self.max_in_flight);
        let failures = AtomicU64::new(0);

        debug!(endpoint, rows = rows.len(), cap = self.max_in_flight, "starting fan-out");

        let calls = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.call_one(&permits, &failures, endpoint, i, row));
        let results = join_all(calls).await;

        FanOutBatch {
            results,
            failures: failures.into_inner(),
        }
    }

    /// POST every row to every endpoint. The result for a row is an array
    /// with one entry per endpoint, in endpoint order. All calls of the batch
    /// share one cap.
    pub async fn call_rows_multi(&self, endpoints: &[String], rows: &[Row]) -> FanOutBatch {
        let permits = Semaphore::new(self.max_in_flight);
        let failures = AtomicU64::new(0);

        debug!(
            endpoints = endpoints.len(),
            rows = rows.len(),
            cap = self.max_in_flight,
            "starting multi-endpoint fan-out"
        );

        let per_row = rows.iter().enumerate().map(|(i, row)| {
            let permits = &permits;
            let failures = &failures;
            async move {
                let calls = endpoints
                    .iter()
                    .map(|endpoint| self.call_one(permits, failures, endpoint, i, row));
                Value::Array(join_all(calls).await)
            }
        });
        let results = join_all(per_row).await;

        FanOutBatch {
            results,
            failures: failures.into_inner(),
        }
    }

    async fn call_one(
        &self,
        permits: &Semaphore,
        failures: &AtomicU64,
        endpoint: &str,
        index: usize,
        row: &Row,
    ) -> Value {
        // The semaphore lives for the whole batch and is never closed.
        let _permit = permits.acquire().await.ok();

        match self.post_row(endpoint, row).await {
            Ok(value) => value,
            Err(err) => {
                failures.fetch_add(1, Ordering::Relaxed);
                let data = Value::Object(row.clone());
                warn!(
                    row = index,
                    endpoint,
                    data = %data,
                    error = %err,
                    "remote call failed"
                );
                self.failed_value.sentinel()
            }
        }
    }

    async fn post_row(&self, endpoint: &str, row: &Row) -> std::result::Result<Value, RemoteCallError> {
        let response = self
            .client
            .post(endpoint)
            .json(row)
            .send()
            .await
            .map_err(|source| RemoteCallError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteCallError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| RemoteCallError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        first_value(body).ok_or_else(|| RemoteCallError::EmptyResponse {
            endpoint: endpoint.to_string(),
        })
    }
}

/// First value of a JSON object, in document order.
fn first_value(body: Value) -> Option<Value> {
    match body {
        Value::Object(map) => map.into_iter().next().map(|(_, v)| v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_value_takes_the_sole_key() {
        assert_eq!(first_value(json!({"prediction": 0.7})), Some(json!(0.7)));
        assert_eq!(first_value(json!({"a": 1, "b": 2})), Some(json!(1)));
        assert_eq!(first_value(json!({})), None);
        assert_eq!(first_value(json!([1, 2])), None);
    }

    #[test]
    fn zero_cap_is_clamped() {
        let caller = FanOutCaller::with_client(Client::new(), 0, FailedCallValue::Null);
        assert_eq!(caller.max_in_flight(), 1);
        assert_eq!(caller.with_max_in_flight(7).max_in_flight(), 7);
    }

    #[test]
    fn request_section_picks_the_cap_per_variant() {
        let requests = RequestSection {
            max_concurrent_requests: 20,
            max_concurrent_multi_requests: 3,
            failed_call_value: FailedCallValue::Error,
            timeout_secs: Some(5),
        };

        let single = FanOutCaller::from_requests(&requests).unwrap();
        assert_eq!(single.max_in_flight(), 20);

        let multi = FanOutCaller::multi_from(&requests).unwrap();
        assert_eq!(multi.max_in_flight(), 3);
        assert_eq!(multi.failed_value(), FailedCallValue::Error);

        let defaults = FanOutCaller::multi_from(&RequestSection::default()).unwrap();
        assert_eq!(defaults.max_in_flight(), 1000);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let caller = FanOutCaller::with_client(Client::new(), 4, FailedCallValue::Error);
        let batch = caller.call_rows("http://127.0.0.1:9/unused", &[]).await;
        assert!(batch.results.is_empty());
        assert_eq!(batch.failures, 0);
    }
}
