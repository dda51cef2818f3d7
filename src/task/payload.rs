// src/task/payload.rs

//! Values passed between tasks.

use serde_json::{Map, Value};

use crate::errors::{FlowdagError, Result};

/// One named record, as posted to a remote endpoint.
pub type Row = Map<String, Value>;

/// Result value of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Tabular data with ordered, named columns.
    Table(Table),
    /// One value per input row (fan-out output).
    Values(Vec<Value>),
    /// Free-form marker, e.g. the name of a written artifact.
    Text(String),
}

impl Payload {
    /// Number of items carried by this payload.
    pub fn len(&self) -> usize {
        match self {
            Payload::Table(t) => t.len(),
            Payload::Values(v) => v.len(),
            Payload::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Payload::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&[Value]> {
        match self {
            Payload::Values(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a list of records suitable for posting row by row.
    ///
    /// Tables map each row to an object keyed by column name. A value list is
    /// accepted when every element is already a JSON object.
    pub fn to_rows(&self) -> Result<Vec<Row>> {
        match self {
            Payload::Table(t) => Ok(t.records()),
            Payload::Values(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::Object(map) => Ok(map.clone()),
                    other => Err(FlowdagError::InvalidPayload(format!(
                        "value #{i} is not an object: {other}"
                    ))),
                })
                .collect(),
            Payload::Text(_) => Err(FlowdagError::InvalidPayload(
                "text payload cannot be split into rows".to_string(),
            )),
        }
    }
}

/// Column-ordered table of JSON values. Nulls represent missing cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FlowdagError::InvalidPayload(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`] but fails with a descriptive error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            FlowdagError::InvalidPayload(format!("missing column '{name}'"))
        })
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn records(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Row>()
            })
            .collect()
    }

    /// Append a column; `values` must have one entry per row.
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(FlowdagError::InvalidPayload(format!(
                "column '{name}' has {} values but table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(self)
    }
}
