// src/pipeline/extract.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::{Number, Value};
use tracing::{debug, info};

use crate::errors::Result;
use crate::task::Table;

/// Read a CSV file with a header row into a [`Table`].
pub fn extract_csv(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let table = read_csv(file)?;
    info!(path = %path.display(), rows = table.len(), columns = table.columns().len(), "extracted CSV");
    Ok(table)
}

/// Parse CSV from any reader. Empty cells become null; integer and float
/// cells become numbers; everything else stays a string.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(parse_cell).collect())?;
    }

    debug!(rows = table.len(), "parsed CSV records");
    Ok(table)
}

fn parse_cell(raw: &str) -> Value {
    let cell = raw.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Some(n) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}
