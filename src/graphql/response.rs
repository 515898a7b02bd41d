use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single execution error, standard query-response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

/// Result of executing a selection: data plus an error list.
///
/// Field-level failures produce a partial response (some data, some errors)
/// rather than failing the execution outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl Response {
    /// A clean response carrying only data.
    pub fn data(value: Value) -> Self {
        Self {
            data: value,
            errors: Vec::new(),
        }
    }

    /// True when the execution produced both data and errors.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty() && !self.data.is_null()
    }
}
