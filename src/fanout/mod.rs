// src/fanout/mod.rs

//! Per-row remote calls with bounded concurrency.

pub mod caller;
pub mod request_task;

pub use caller::{FanOutBatch, FanOutCaller, RemoteCallError};
pub use request_task::{multi_request_task, request_task};
