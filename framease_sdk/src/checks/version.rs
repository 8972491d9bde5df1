//! Firmware version check (`fg_version`)

use super::configuration;
use crate::datasources::CONFIGURATION_TAG;
use framease_base::plugins::{parameter, CheckPlugin, PluginError};
use framease_base::results::{CheckOutput, CheckResult, Results};
use framease_base::types::{ParamKind, ParamSpec};
use serde_json::Value;

#[derive(Default)]
pub struct VersionCheck;

impl VersionCheck {
    pub fn new() -> Self {
        Self
    }
}

impl CheckPlugin for VersionCheck {
    fn name(&self) -> &str {
        "fg_version"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(ParamKind::Str, "fw_version", "expected firmware version, e.g. 7.2.5")]
    }

    fn requires(&self) -> Vec<String> {
        vec![CONFIGURATION_TAG.to_string()]
    }

    fn description(&self) -> &str {
        "Compares the dump's firmware version with an expected version"
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let expected = parameter(envelope, &["fw_version", "version"])
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::execution(self.name(), "missing parameter 'fw_version'"))?;
        let description = format!("Software Version is {}", expected);

        let result = match configuration(envelope, self.name())?
            .get("fw_version")
            .and_then(Value::as_str)
        {
            Some(actual) if actual == expected => CheckResult::pass(description),
            Some(actual) => CheckResult::fail(format!("{} ({})", description, actual)),
            None => CheckResult::fail(description).with_detail("firmware version not found in dump"),
        };
        Ok(Results::from(result).into())
    }
}
