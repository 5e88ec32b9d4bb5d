use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Non-fatal anomalies found while computing. The affected step degrades to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// A filing or notice date failed strict `YYYY-MM-DD` validation.
    InvalidDate { field: String, value: String },
    /// New regime was selected for a year that does not offer it.
    NewRegimeUnavailable,
}
