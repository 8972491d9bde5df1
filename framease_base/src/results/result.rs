//! Per-check result and the ordered result collection

use crate::results::error::{value_kind, MalformedResultError};
use crate::results::status::Status;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::ops::{AddAssign, BitOrAssign};

/// Outcome of one evaluated setting, step or probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub description: String,

    #[serde(default)]
    pub validation_status: Status,

    /// Only set by manual attestation or human sign-off
    #[serde(default)]
    pub approval_status: Status,

    #[serde(default, deserialize_with = "deserialize_details")]
    pub details: Vec<String>,
}

impl CheckResult {
    pub fn new(description: impl Into<String>, validation_status: Status) -> Self {
        Self {
            description: description.into(),
            validation_status,
            approval_status: Status::None,
            details: Vec::new(),
        }
    }

    pub fn pass(description: impl Into<String>) -> Self {
        Self::new(description, Status::Pass)
    }

    pub fn fail(description: impl Into<String>) -> Self {
        Self::new(description, Status::Fail)
    }

    pub fn warn(description: impl Into<String>) -> Self {
        Self::new(description, Status::Warn)
    }

    pub fn with_approval(mut self, approval_status: Status) -> Self {
        self.approval_status = approval_status;
        self
    }

    /// Strings are stored verbatim, anything else as its JSON text
    pub fn add_detail(&mut self, detail: impl Into<Value>) {
        self.details.push(match detail.into() {
            Value::String(s) => s,
            other => other.to_string(),
        });
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.add_detail(detail);
        self
    }

    pub fn is_pass(&self) -> bool {
        self.validation_status.is_pass()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "description": self.description,
            "validation_status": self.validation_status.as_str(),
            "approval_status": self.approval_status.as_str(),
            "details": self.details,
        })
    }

    /// Parse one stored entry.
    ///
    /// Entries may be objects or JSON text of an object. `fallback` fills a
    /// missing description (dictionary-shaped legacy output keys results by
    /// description).
    pub fn from_value(value: &Value, fallback: Option<&str>) -> Result<Self, MalformedResultError> {
        match value {
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text).map_err(|e| {
                    MalformedResultError::InvalidJson {
                        reason: e.to_string(),
                    }
                })?;
                Self::from_value(&parsed, fallback)
            }
            Value::Object(map) => {
                let mut map = map.clone();
                if !map.contains_key("description") {
                    if let Some(description) = fallback {
                        map.insert("description".to_string(), json!(description));
                    }
                }
                serde_json::from_value(Value::Object(map)).map_err(|e| {
                    MalformedResultError::InvalidResult {
                        reason: e.to_string(),
                    }
                })
            }
            other => Err(MalformedResultError::unsupported(other)),
        }
    }
}

/// Details arrive as a list, as JSON text of a list, or missing
fn deserialize_details<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(details_from_value(value))
}

fn details_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed @ Value::Array(_)) => details_from_value(parsed),
            _ => vec![text],
        },
        other => vec![other.to_string()],
    }
}

// ============================================================================
// Results
// ============================================================================

/// Ordered, append-only collection of results.
///
/// Merging concatenates; entries sharing a description are all kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Results {
    results: Vec<CheckResult>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: CheckResult) -> &mut Self {
        self.results.push(result);
        self
    }

    /// Append every entry of `other`, preserving order
    pub fn merge(&mut self, other: Results) -> &mut Self {
        self.results.extend(other.results);
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CheckResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn pass_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_pass()).count()
    }

    pub fn count_status(&self, status: Status) -> usize {
        self.results
            .iter()
            .filter(|r| r.validation_status == status)
            .count()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "results": self.results.iter().map(CheckResult::to_value).collect::<Vec<_>>(),
        })
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn from_json(text: &str) -> Result<Self, MalformedResultError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| MalformedResultError::InvalidJson {
                reason: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    /// Parse a stored results blob.
    ///
    /// Accepts `{results: [...]}` (entries as objects or JSON text), a single
    /// result object, or JSON text of either.
    pub fn from_value(value: &Value) -> Result<Self, MalformedResultError> {
        match value {
            Value::String(text) => Self::from_json(text),
            Value::Object(map) => match map.get("results") {
                Some(Value::Array(entries)) => entries
                    .iter()
                    .map(|entry| CheckResult::from_value(entry, None))
                    .collect(),
                Some(other) => Err(MalformedResultError::InvalidResult {
                    reason: format!("'results' must be an array, got {}", value_kind(other)),
                }),
                None if map.contains_key("description") => {
                    CheckResult::from_value(value, None).map(Results::from)
                }
                None => Err(MalformedResultError::unsupported(value)),
            },
            other => Err(MalformedResultError::unsupported(other)),
        }
    }
}

impl From<CheckResult> for Results {
    fn from(result: CheckResult) -> Self {
        Self {
            results: vec![result],
        }
    }
}

impl FromIterator<CheckResult> for Results {
    fn from_iter<I: IntoIterator<Item = CheckResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl Extend<CheckResult> for Results {
    fn extend<I: IntoIterator<Item = CheckResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

impl IntoIterator for Results {
    type Item = CheckResult;
    type IntoIter = std::vec::IntoIter<CheckResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a CheckResult;
    type IntoIter = std::slice::Iter<'a, CheckResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl AddAssign<CheckResult> for Results {
    fn add_assign(&mut self, result: CheckResult) {
        self.add(result);
    }
}

impl BitOrAssign<Results> for Results {
    fn bitor_assign(&mut self, other: Results) {
        self.merge(other);
    }
}

impl<'de> Deserialize<'de> for Results {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Results::from_value(&value).map_err(serde::de::Error::custom)
    }
}
