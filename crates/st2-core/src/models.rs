use crate::errors::{Result, St2Error};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A decoded JSON response body.
///
/// Every success body is decoded into exactly one of these shapes. JSON `null`
/// (and an empty body) is `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Map(Map<String, Value>),
    Sequence(Vec<Value>),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    #[default]
    Absent,
}

impl ResponseValue {
    /// Decode a response body from JSON text
    pub fn from_json_text(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(ResponseValue::Absent);
        }

        let value: Value = serde_json::from_str(text)
            .map_err(|e| St2Error::InvalidResponse(format!("body is not valid JSON: {}", e)))?;

        Ok(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ResponseValue::Absent)
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            ResponseValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            ResponseValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResponseValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl From<Value> for ResponseValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ResponseValue::Map(map),
            Value::Array(items) => ResponseValue::Sequence(items),
            Value::Bool(b) => ResponseValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ResponseValue::Integer(i),
                // u64 beyond i64::MAX and non-integers
                None => n
                    .as_f64()
                    .map(ResponseValue::Float)
                    .unwrap_or(ResponseValue::Absent),
            },
            Value::String(s) => ResponseValue::String(s),
            Value::Null => ResponseValue::Absent,
        }
    }
}

/// Status of a remote execution as seen by the polling helpers.
///
/// The remote system reports arbitrary status strings; only `succeeded` and
/// `failed` are terminal. `Missing` is produced locally when the execution id
/// does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    Missing,
    /// Any other status, e.g. "requested", "scheduled", "running"
    Other(String),
}

impl ExecutionStatus {
    pub const SUCCEEDED: &'static str = "succeeded";
    pub const FAILED: &'static str = "failed";
    pub const MISSING: &'static str = "missing";

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Succeeded => Self::SUCCEEDED,
            ExecutionStatus::Failed => Self::FAILED,
            ExecutionStatus::Missing => Self::MISSING,
            ExecutionStatus::Other(s) => s,
        }
    }

    /// Terminal statuses end a wait; `Missing` counts as terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Other(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded)
    }

    /// Interpret the `status` field of an execution document
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => ExecutionStatus::from(s.as_str()),
            other => ExecutionStatus::Other(other.to_string()),
        }
    }
}

impl From<&str> for ExecutionStatus {
    fn from(status: &str) -> Self {
        match status {
            Self::SUCCEEDED => ExecutionStatus::Succeeded,
            Self::FAILED => ExecutionStatus::Failed,
            Self::MISSING => ExecutionStatus::Missing,
            other => ExecutionStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
