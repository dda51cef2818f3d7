use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Which fixed pipeline shape to assemble.
///
/// - `Offer`: extract, transform, two parallel predictions, combiner, offer
///   recommendation and load (seven tasks).
/// - `Ats`: extract, transform and three sequential prediction fan-outs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    #[value(alias = "OfferWorkFlow")]
    Offer,
    #[value(alias = "ATSWorkFlow")]
    Ats,
}

impl Default for WorkflowKind {
    fn default() -> Self {
        WorkflowKind::Offer
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Offer => f.write_str("offer"),
            WorkflowKind::Ats => f.write_str("ats"),
        }
    }
}

/// Value substituted for a row whose remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedCallValue {
    /// JSON `null`.
    Null,
    /// The literal string `"ERROR"`.
    Error,
}

impl FailedCallValue {
    pub const ERROR_MARKER: &'static str = "ERROR";

    pub fn sentinel(self) -> Value {
        match self {
            FailedCallValue::Null => Value::Null,
            FailedCallValue::Error => Value::String(Self::ERROR_MARKER.to_string()),
        }
    }

    /// Whether `value` is the sentinel under this policy.
    pub fn is_sentinel(self, value: &Value) -> bool {
        *value == self.sentinel()
    }
}

impl Default for FailedCallValue {
    fn default() -> Self {
        FailedCallValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_kind_accepts_legacy_names() {
        assert_eq!(WorkflowKind::from_str("OfferWorkFlow", false), Ok(WorkflowKind::Offer));
        assert_eq!(WorkflowKind::from_str("ATSWorkFlow", false), Ok(WorkflowKind::Ats));
        assert_eq!(WorkflowKind::from_str("ats", false), Ok(WorkflowKind::Ats));
        assert!(WorkflowKind::from_str("batch", false).is_err());
    }

    #[test]
    fn sentinel_policy() {
        assert_eq!(FailedCallValue::Null.sentinel(), Value::Null);
        assert_eq!(
            FailedCallValue::Error.sentinel(),
            Value::String("ERROR".to_string())
        );
        assert!(FailedCallValue::Error.is_sentinel(&Value::String("ERROR".into())));
        assert!(!FailedCallValue::Null.is_sentinel(&Value::from(1)));
    }
}
