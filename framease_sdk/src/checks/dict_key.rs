//! Dictionary key check (`validate_dict_key`)
//!
//! Passes when `data[key] == value`. Returns a bare boolean, the oldest
//! plugin output shape, which the evaluator normalizes into one result.

use framease_base::plugins::{parameter, CheckPlugin, PluginError};
use framease_base::results::CheckOutput;
use framease_base::types::{ParamKind, ParamSpec};
use serde_json::Value;

#[derive(Default)]
pub struct DictKeyCheck;

impl DictKeyCheck {
    pub fn new() -> Self {
        Self
    }
}

impl CheckPlugin for DictKeyCheck {
    fn name(&self) -> &str {
        "validate_dict_key"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new(ParamKind::Str, "key", "key to look up in data"),
            ParamSpec::new(ParamKind::Json, "value", "expected value of data[key]"),
            ParamSpec::new(ParamKind::Obj, "data", "object holding the key"),
        ]
    }

    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let missing = |name: &str| PluginError::execution(self.name(), format!("missing parameter '{}'", name));
        let key = parameter(envelope, &["key"])
            .and_then(Value::as_str)
            .ok_or_else(|| missing("key"))?;
        let value = parameter(envelope, &["value"]).ok_or_else(|| missing("value"))?;
        let data = parameter(envelope, &["data"])
            .and_then(Value::as_object)
            .ok_or_else(|| missing("data"))?;

        let actual = data.get(key).ok_or_else(|| {
            PluginError::execution(self.name(), format!("key '{}' not present in data", key))
        })?;
        Ok(CheckOutput::Legacy(Value::Bool(actual == value)))
    }
}
