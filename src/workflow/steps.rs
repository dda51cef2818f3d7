// src/workflow/steps.rs

//! Task constructors shared by the workflow shapes.

use std::path::PathBuf;

use crate::pipeline::{attach_predictions, combine, extract_csv, transform, write_csv, PREDICTION_FIELDS};
use crate::task::{Payload, Task, TaskOutput};

pub const EXTRACT: &str = "Extract";
pub const TRANSFORM: &str = "Transform";
pub const ATS_PREDICT: &str = "ATS Predict";
pub const RESP_PREDICT: &str = "RESP Predict";
pub const RESP2_PREDICT: &str = "RESP2 Predict";
pub const COMBINER: &str = "ATS-RESP Combiner";
pub const OFFER_RECOMMENDATION: &str = "Offer Recommendation";
pub const LOAD: &str = "Load";

/// Read the input CSV.
pub fn extract_task(csv_path: PathBuf) -> Task {
    Task::blocking(EXTRACT, move |_| {
        let table = extract_csv(&csv_path)?;
        let rows = table.len() as u64;
        Ok(TaskOutput::new(Payload::Table(table), rows, 0))
    })
}

/// Member features from the extracted table.
pub fn transform_task() -> Task {
    Task::blocking(TRANSFORM, |inputs| {
        let features = transform(inputs.table(0)?)?;
        let members = features.len() as u64;
        Ok(TaskOutput::new(Payload::Table(features), members, 0))
    })
    .after([EXTRACT])
}

/// Pair up ATS and RESP predictions per member.
pub fn combiner_task() -> Task {
    Task::blocking(COMBINER, |inputs| {
        let records = combine(&[inputs.values(0)?, inputs.values(1)?], &PREDICTION_FIELDS);
        let count = records.len() as u64;
        Ok(TaskOutput::new(Payload::Values(records), count, 0))
    })
    .after([ATS_PREDICT, RESP_PREDICT])
}

/// Write features plus predictions and offers to `output`.
pub fn load_task(output: PathBuf) -> Task {
    Task::blocking(LOAD, move |inputs| {
        let table = attach_predictions(
            inputs.table(0)?.clone(),
            inputs.values(1)?.to_vec(),
            inputs.values(2)?.to_vec(),
            inputs.values(3)?.to_vec(),
        )?;
        write_csv(&table, &output)?;
        Ok(TaskOutput::new(Payload::Text("load".to_string()), table.len() as u64, 0))
    })
    .after([TRANSFORM, ATS_PREDICT, RESP_PREDICT, OFFER_RECOMMENDATION])
}
