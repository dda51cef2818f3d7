// src/pipeline/combine.rs

use serde_json::{Map, Value};

/// Field names of the records posted to the offer endpoint.
pub const PREDICTION_FIELDS: [&str; 2] = ["ats_prediction", "resp_prediction"];

/// Zip parallel value lists into records, one field per list.
///
/// Stops at the shortest list, or at `fields.len()` lists.
pub fn combine(lists: &[&[Value]], fields: &[&str]) -> Vec<Value> {
    let len = lists.iter().map(|l| l.len()).min().unwrap_or(0);

    (0..len)
        .map(|i| {
            let record: Map<String, Value> = fields
                .iter()
                .zip(lists.iter())
                .map(|(field, list)| (field.to_string(), list[i].clone()))
                .collect();
            Value::Object(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zips_by_position() {
        let ats = vec![json!(10.0), json!(Value::Null), json!(30.0)];
        let resp = vec![json!(0.5), json!(0.6), json!(0.7)];

        let out = combine(&[&ats, &resp], &PREDICTION_FIELDS);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0], json!({"ats_prediction": 10.0, "resp_prediction": 0.5}));
        assert_eq!(out[1]["ats_prediction"], Value::Null);
    }

    #[test]
    fn shortest_list_wins() {
        let a = vec![json!(1), json!(2)];
        let b = vec![json!(3)];
        assert_eq!(combine(&[&a, &b], &PREDICTION_FIELDS).len(), 1);
        assert!(combine(&[], &PREDICTION_FIELDS).is_empty());
    }
}
