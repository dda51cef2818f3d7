// src/task/inputs.rs

use std::sync::Arc;

use serde_json::Value;

use crate::errors::{FlowdagError, Result};
use crate::task::payload::{Payload, Table};
use crate::types::TaskName;

/// Dependency results handed to a task, in the order its dependencies were
/// declared.
///
/// An entry is `None` when the upstream task failed. Accessors such as
/// [`Inputs::require`] turn that absence into a `MissingInput` error, which is
/// how upstream failures propagate through data.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    entries: Vec<(TaskName, Option<Arc<Payload>>)>,
}

impl Inputs {
    pub fn new(entries: Vec<(TaskName, Option<Arc<Payload>>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Result at `index`, or `None` if absent or out of range.
    pub fn get(&self, index: usize) -> Option<&Payload> {
        self.entries
            .get(index)
            .and_then(|(_, payload)| payload.as_deref())
    }

    pub fn require(&self, index: usize) -> Result<&Payload> {
        let (name, payload) = self.entries.get(index).ok_or_else(|| {
            FlowdagError::InvalidPayload(format!(
                "expected input #{index} but only {} dependencies were declared",
                self.entries.len()
            ))
        })?;
        payload
            .as_deref()
            .ok_or_else(|| FlowdagError::MissingInput(name.clone()))
    }

    pub fn table(&self, index: usize) -> Result<&Table> {
        let payload = self.require(index)?;
        payload.as_table().ok_or_else(|| {
            FlowdagError::InvalidPayload(format!("input #{index} is not a table"))
        })
    }

    pub fn values(&self, index: usize) -> Result<&[Value]> {
        let payload = self.require(index)?;
        payload.as_values().ok_or_else(|| {
            FlowdagError::InvalidPayload(format!("input #{index} is not a value list"))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Payload>)> {
        self.entries
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.as_deref()))
    }
}
