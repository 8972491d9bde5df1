//! Check plugin output and normalization into `Results`

use crate::results::error::{value_kind, MalformedResultError};
use crate::results::result::{CheckResult, Results};
use crate::results::status::Status;
use serde_json::Value;

/// What a check plugin hands back to the evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutput {
    Results(Results),
    /// Older plugin shapes: a bare boolean, a map of description to boolean
    /// or to a serialized result, or a `{results: [...]}` blob
    Legacy(Value),
}

impl CheckOutput {
    /// Convert into `Results`, attributing bare booleans to `plugin`
    pub fn normalize(self, plugin: &str) -> Result<Results, MalformedResultError> {
        match self {
            CheckOutput::Results(results) => Ok(results),
            CheckOutput::Legacy(value) => normalize_legacy(plugin, &value),
        }
    }
}

impl From<Results> for CheckOutput {
    fn from(results: Results) -> Self {
        CheckOutput::Results(results)
    }
}

impl From<bool> for CheckOutput {
    fn from(passed: bool) -> Self {
        CheckOutput::Legacy(Value::Bool(passed))
    }
}

pub fn normalize_legacy(plugin: &str, value: &Value) -> Result<Results, MalformedResultError> {
    match value {
        Value::Bool(passed) => Ok(CheckResult::new(plugin, Status::from_bool(*passed)).into()),
        Value::String(text) => {
            let parsed: Value =
                serde_json::from_str(text).map_err(|e| MalformedResultError::InvalidJson {
                    reason: e.to_string(),
                })?;
            normalize_legacy(plugin, &parsed)
        }
        Value::Object(map) if map.contains_key("results") || map.contains_key("description") => {
            Results::from_value(value)
        }
        Value::Object(map) => {
            let mut results = Results::new();
            for (description, entry) in map {
                let result = match entry {
                    Value::Bool(passed) => {
                        CheckResult::new(description.clone(), Status::from_bool(*passed))
                    }
                    Value::Object(_) | Value::String(_) => {
                        CheckResult::from_value(entry, Some(description.as_str()))?
                    }
                    other => {
                        return Err(MalformedResultError::UnsupportedShape {
                            shape: format!("entry '{}' is {}", description, value_kind(other)),
                        })
                    }
                };
                results.add(result);
            }
            Ok(results)
        }
        other => Err(MalformedResultError::unsupported(other)),
    }
}
