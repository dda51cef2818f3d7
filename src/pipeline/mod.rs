// src/pipeline/mod.rs

//! Data-shaping steps used by the workflows: CSV in, member features,
//! prediction records, CSV out.

pub mod combine;
pub mod extract;
pub mod load;
pub mod transform;

pub use combine::{combine, PREDICTION_FIELDS};
pub use extract::{extract_csv, read_csv};
pub use load::{attach_predictions, write_csv};
pub use transform::{transform, transform_at, FEATURE_COLUMNS};
