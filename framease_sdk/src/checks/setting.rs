//! Single-setting check (`fg_setting`)
//!
//! Walks an explicit `config_path` through the parsed hierarchy and compares
//! one setting against an expected value.

use super::{configuration, expected_values, spec_error, spec_list, validate_setting, MatchOptions};
use crate::datasources::CONFIGURATION_TAG;
use framease_base::plugins::{flag, CheckPlugin, PluginError};
use framease_base::results::{CheckOutput, CheckResult, Results};
use framease_base::types::{ParamKind, ParamSpec};
use serde_json::Value;

#[derive(Default)]
pub struct SettingCheck;

impl SettingCheck {
    pub fn new() -> Self {
        Self
    }

    fn evaluate_spec(&self, hierarchy: &Value, spec: &Value) -> CheckResult {
        let path: Option<Vec<&str>> = match spec.get("config_path") {
            Some(Value::Array(segments)) => segments.iter().map(Value::as_str).collect(),
            Some(Value::String(segment)) => Some(vec![segment.as_str()]),
            _ => None,
        };
        let setting = spec.get("setting").and_then(Value::as_str);
        let description = match spec.get("description").and_then(Value::as_str) {
            Some(description) => description.to_string(),
            None => format!(
                "{}:{}",
                path.as_ref().map(|p| p.join("|")).unwrap_or_default(),
                setting.unwrap_or_default()
            ),
        };

        let Some(path) = path else {
            return CheckResult::fail(spec_error(&description, "config_path"));
        };
        let Some(setting) = setting else {
            return CheckResult::fail(spec_error(&description, "setting"));
        };
        let Some(expected) = spec.get("value").and_then(|v| expected_values(v, false)) else {
            return CheckResult::fail(spec_error(&description, "value"));
        };

        let mut context = hierarchy;
        for segment in &path {
            match context.get(*segment).filter(|node| node.is_object()) {
                Some(node) => context = node,
                None => {
                    return CheckResult::fail(description)
                        .with_detail(format!("context not found: {}", segment));
                }
            }
        }

        let options = MatchOptions {
            or_empty: flag(spec, "or_empty"),
            partial_match: flag(spec, "partial_match"),
        };
        if validate_setting(context, setting, &expected, options) {
            return CheckResult::pass(description);
        }
        let mut result = CheckResult::fail(description);
        match context.get(setting).and_then(Value::as_str) {
            Some(actual) => result.add_detail(format!("actual: {}", actual)),
            None => result.add_detail(format!("setting not present: {}", setting)),
        }
        result
    }
}

impl CheckPlugin for SettingCheck {
    fn name(&self) -> &str {
        "fg_setting"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(
            ParamKind::List,
            "setting_specs",
            "config_path, setting, value, or_empty:False, partial_match:False, description:<{config_path}:{setting}>",
        )]
    }

    fn requires(&self) -> Vec<String> {
        vec![CONFIGURATION_TAG.to_string()]
    }

    fn description(&self) -> &str {
        "Compares one setting at an explicit configuration path"
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let specs = spec_list(envelope, &["setting_specs", "setting_spec"], self.name())?;
        let hierarchy = configuration(envelope, self.name())?
            .get("hierarchy")
            .ok_or_else(|| PluginError::execution(self.name(), "configuration has no hierarchy"))?;

        let results: Results = specs
            .iter()
            .map(|spec| self.evaluate_spec(hierarchy, spec))
            .collect();
        Ok(results.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use framease_base::results::Status;
    use serde_json::json;

    fn envelope(specs: Value) -> Value {
        json!({
            "fgt_cli_configuration": {
                "hierarchy": {
                    "config system admin": {"edit \"admin\"": {"accprofile": "\"super_admin\""}},
                    "config system global": {"admin-lockout-threshold": "3"}
                }
            },
            "parameters": {"setting_specs": specs}
        })
    }

    fn run(specs: Value) -> Results {
        match SettingCheck::new().check(&envelope(specs)).unwrap() {
            CheckOutput::Results(results) => results,
            CheckOutput::Legacy(value) => panic!("unexpected legacy output {}", value),
        }
    }

    #[test]
    fn test_admin_profile_passes() {
        let results = run(json!([{
            "config_path": ["config system admin", "edit \"admin\""],
            "setting": "accprofile",
            "value": "\"super_admin\""
        }]));
        assert_eq!(results.len(), 1);
        let result = &results.as_slice()[0];
        assert_eq!(result.validation_status, Status::Pass);
        assert_eq!(
            result.description,
            "config system admin|edit \"admin\":accprofile"
        );
    }

    #[test]
    fn test_mismatch_reports_actual_value() {
        let results = run(json!([{
            "config_path": ["config system global"],
            "setting": "admin-lockout-threshold",
            "value": "5",
            "description": "Lockout threshold is 5"
        }]));
        let result = &results.as_slice()[0];
        assert_eq!(result.description, "Lockout threshold is 5");
        assert_eq!(result.validation_status, Status::Fail);
        assert_eq!(result.details, vec!["actual: 3"]);
    }

    #[test]
    fn test_absent_setting_and_or_empty() {
        let results = run(json!([
            {"config_path": ["config system global"], "setting": "timezone", "value": "04"},
            {"config_path": ["config system global"], "setting": "timezone", "value": "04", "or_empty": true},
            {"config_path": ["config system global"], "setting": "admin-lockout-threshold", "value": "3", "partial_match": true}
        ]));
        let statuses: Vec<Status> = results.iter().map(|r| r.validation_status).collect();
        assert_eq!(statuses, vec![Status::Fail, Status::Pass, Status::Pass]);
    }

    #[test]
    fn test_missing_path_and_malformed_spec() {
        let results = run(json!([
            {"config_path": ["config vpn ssl settings"], "setting": "status", "value": "disable"},
            {"setting": "status", "value": "disable"}
        ]));
        assert_eq!(results.as_slice()[0].validation_status, Status::Fail);
        assert_eq!(
            results.as_slice()[0].details,
            vec!["context not found: config vpn ssl settings"]
        );
        assert_eq!(results.as_slice()[1].description, ":status [ERROR: config_path]");
    }

    #[test]
    fn test_legacy_parameter_name() {
        let envelope = json!({
            "fgt_cli_configuration": {"hierarchy": {"config system global": {"a": "b"}}},
            "parameters": {"setting_spec": [{"config_path": ["config system global"], "setting": "a", "value": "b"}]}
        });
        let output = SettingCheck::new().check(&envelope).unwrap();
        assert_matches!(output, CheckOutput::Results(results) if results.pass_count() == 1);
    }

    #[test]
    fn test_missing_inputs() {
        let check = SettingCheck::new();
        assert_matches!(
            check.check(&json!({"parameters": {"setting_specs": []}})),
            Err(PluginError::MissingInput { .. })
        );
        assert_matches!(
            check.check(&json!({"fgt_cli_configuration": {"hierarchy": {}}, "parameters": {}})),
            Err(PluginError::PluginExecutionError { .. })
        );
    }
}
