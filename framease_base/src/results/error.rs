// results/error.rs

use framease_parser::logging::{codes, Code};
use serde_json::Value;

/// Output that cannot be normalized into `Results`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResultError {
    #[error("Result payload is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Invalid result entry: {reason}")]
    InvalidResult { reason: String },

    #[error("Unsupported result shape: {shape}")]
    UnsupportedShape { shape: String },
}

impl MalformedResultError {
    pub fn error_code(&self) -> Code {
        codes::plugin::MALFORMED_RESULT
    }

    pub(crate) fn unsupported(value: &Value) -> Self {
        MalformedResultError::UnsupportedShape {
            shape: value_kind(value).to_string(),
        }
    }
}

/// JSON type name for diagnostics
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
