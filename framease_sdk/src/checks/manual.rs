//! Manual attestation check (`manual`)
//!
//! Emits one `[MANUAL CHECK]` result per declared step. Steps await a human
//! (`WARN` validation and approval) unless marked `auto_pass`.

use super::spec_error;
use framease_base::plugins::{flag, parameter, CheckPlugin, PluginError};
use framease_base::results::{CheckOutput, CheckResult, Results, Status};
use framease_base::types::{ParamKind, ParamSpec};
use serde_json::Value;

pub const MANUAL_PREFIX: &str = "[MANUAL CHECK] ";

#[derive(Default)]
pub struct ManualCheck;

impl ManualCheck {
    pub fn new() -> Self {
        Self
    }
}

impl CheckPlugin for ManualCheck {
    fn name(&self) -> &str {
        "manual"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new(ParamKind::List, "manual_steps", "str:description, auto_pass:False"),
            ParamSpec::new(ParamKind::Str, "auto_pass", "pass every step without review"),
        ]
    }

    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self) -> &str {
        "Records steps that must be attested by a person"
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let steps = match parameter(envelope, &["manual_steps", "manual_checks"]) {
            Some(Value::Array(steps)) => steps.as_slice(),
            Some(_) => {
                return Err(PluginError::execution(
                    self.name(),
                    "parameter 'manual_steps' must be a list",
                ))
            }
            None => &[],
        };
        let auto_pass_all = envelope
            .get("parameters")
            .map(|params| flag(params, "auto_pass"))
            .unwrap_or(false);

        let mut results = Results::new();
        for step in steps {
            let description = match step {
                Value::String(text) => Some(text.as_str()),
                other => other.get("description").and_then(Value::as_str),
            };
            let Some(description) = description else {
                results.add(CheckResult::fail(spec_error(MANUAL_PREFIX.trim_end(), "description")));
                continue;
            };

            let status = if auto_pass_all || flag(step, "auto_pass") {
                Status::Pass
            } else {
                Status::Warn
            };
            results.add(
                CheckResult::new(format!("{}{}", MANUAL_PREFIX, description), status)
                    .with_approval(status),
            );
        }
        Ok(results.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framease_base::results::RowStatus;
    use framease_base::results::automated_status;
    use serde_json::json;

    fn run(parameters: Value) -> Results {
        match ManualCheck::new()
            .check(&json!({ "parameters": parameters }))
            .unwrap()
        {
            CheckOutput::Results(results) => results,
            CheckOutput::Legacy(value) => panic!("unexpected legacy output {}", value),
        }
    }

    #[test]
    fn test_steps_await_review() {
        let results = run(json!({"manual_steps": [
            {"description": "Verify console port is locked"},
            "Confirm firmware signature"
        ]}));
        assert_eq!(results.len(), 2);
        let first = &results.as_slice()[0];
        assert_eq!(first.description, "[MANUAL CHECK] Verify console port is locked");
        assert_eq!(first.validation_status, Status::Warn);
        assert_eq!(first.approval_status, Status::Warn);
        assert_eq!(automated_status(Some(&results)), RowStatus::Failure);
    }

    #[test]
    fn test_auto_pass() {
        let results = run(json!({"manual_checks": [
            {"description": "a", "auto_pass": true},
            {"description": "b"}
        ]}));
        let statuses: Vec<Status> = results.iter().map(|r| r.validation_status).collect();
        assert_eq!(statuses, vec![Status::Pass, Status::Warn]);

        let results = run(json!({"auto_pass": true, "manual_steps": [{"description": "a"}]}));
        assert_eq!(results.as_slice()[0].approval_status, Status::Pass);
    }

    #[test]
    fn test_no_steps() {
        assert!(run(json!({})).is_empty());
        let results = run(json!({"manual_steps": [{"note": "x"}]}));
        assert_eq!(results.as_slice()[0].description, "[MANUAL CHECK] [ERROR: description]");
    }
}
