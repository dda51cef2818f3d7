// src/pipeline/load.rs

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::errors::Result;
use crate::task::Table;

/// Append the prediction and offer columns to `features`.
pub fn attach_predictions(
    features: Table,
    ats: Vec<Value>,
    resp: Vec<Value>,
    offer: Vec<Value>,
) -> Result<Table> {
    features
        .with_column("ATS", ats)?
        .with_column("RESP", resp)?
        .with_column("OFFER", offer)
}

/// Write `table` as CSV, creating parent directories as needed.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_table(table, file)?;
    info!(path = %path.display(), rows = table.len(), "wrote result CSV");
    Ok(())
}

pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(cell_text))?;
    }
    wtr.flush()?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
