//! Per-entry check (`fg_each`)
//!
//! Selects the `edit` entries of one table (firewall policies, addresses,
//! admins, ...), evaluates a setting on every selected entry and folds the
//! per-entry outcomes into one result through a pass threshold.

use super::{configuration, expected_values, spec_error, spec_list, split_alternatives};
use super::{validate_setting, MatchOptions};
use crate::datasources::CONFIGURATION_TAG;
use framease_base::plugins::{flag, CheckPlugin, PluginError};
use framease_base::results::{CheckOutput, CheckResult, Results};
use framease_base::types::{ParamKind, ParamSpec};
use framease_parser::log_debug;
use serde_json::Value;

/// Table selected by a spec's `type`
pub fn table_context(spec_type: &str) -> Option<&'static str> {
    match spec_type {
        "policy" => Some("config firewall policy"),
        "addr" => Some("config firewall address"),
        "addr6" => Some("config firewall address6"),
        "addrgrp" => Some("config firewall addrgrp"),
        "addr6grp" => Some("config firewall addr6grp"),
        "admin" => Some("config system admin"),
        "tacuser" => Some("config user tacacs+"),
        "usergroup" => Some("config user group"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    All,
    Names(Vec<String>),
}

impl Selector {
    fn parse(select: &str) -> Option<Self> {
        if let Some(names) = select.strip_prefix("id:") {
            return Some(Selector::Names(split_alternatives(names)));
        }
        match select {
            "all" | "any" => Some(Selector::All),
            _ => None,
        }
    }

    /// Entry directives are `edit <name>` or `edit "<name>"`
    fn matches(&self, directive: &str, negate: bool) -> bool {
        let matched = match self {
            Selector::All => true,
            Selector::Names(names) => names.iter().any(|name| {
                directive == format!("edit {}", name) || directive == format!("edit \"{}\"", name)
            }),
        };
        matched != negate
    }
}

/// Aggregation over per-entry outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threshold {
    /// At least one pass and no failures
    All,
    /// At least one pass
    Any,
    /// At least one failure and no passes; reported with the counts swapped
    None,
    /// Strictly more than `n` passes
    MoreThan(u64),
}

impl Threshold {
    fn parse(value: Option<&Value>) -> Option<Self> {
        let text = match value {
            None => return Some(Threshold::All),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => return None,
        };
        match text.as_str() {
            "all" => Some(Threshold::All),
            "any" => Some(Threshold::Any),
            "none" => Some(Threshold::None),
            digits => match digits.parse::<u64>().ok()? {
                0 => Some(Threshold::None),
                n => Some(Threshold::MoreThan(n)),
            },
        }
    }

    fn summarize(self, description: &str, counts: Counts) -> CheckResult {
        let Counts {
            passed,
            failed,
            matched,
        } = counts;
        let (ok, shown_pass, shown_fail) = match self {
            Threshold::All => (passed > 0 && failed == 0, passed, failed),
            Threshold::Any => (passed > 0, passed, failed),
            Threshold::None => (failed > 0 && passed == 0, failed, passed),
            Threshold::MoreThan(n) => (passed as u64 > n, passed, failed),
        };
        let description = format!(
            "{} ({} pass/{} fail/{} matched)",
            description, shown_pass, shown_fail, matched
        );
        if ok {
            CheckResult::pass(description)
        } else {
            CheckResult::fail(description)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    passed: usize,
    failed: usize,
    matched: usize,
}

#[derive(Default)]
pub struct EachEntryCheck;

impl EachEntryCheck {
    pub fn new() -> Self {
        Self
    }

    fn evaluate_spec(&self, hierarchy: &Value, spec: &Value, results: &mut Results) {
        let spec_type = spec.get("type").and_then(Value::as_str).unwrap_or_default();
        let select = spec.get("select").and_then(Value::as_str).unwrap_or("all");
        let setting = spec.get("setting").and_then(Value::as_str).unwrap_or_default();
        let description = spec
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}:{}:{}", spec_type, select, setting));

        let Some(table) = table_context(spec_type) else {
            results.add(CheckResult::fail(spec_error(&description, "type")));
            return;
        };
        let Some(selector) = Selector::parse(select) else {
            results.add(CheckResult::fail(spec_error(&description, "select")));
            return;
        };
        let Some(threshold) = Threshold::parse(
            spec.get("pass_threshold").or_else(|| spec.get("pass_threshhold")),
        ) else {
            results.add(CheckResult::fail(spec_error(&description, "pass_threshhold")));
            return;
        };

        let fail_on_match = flag(spec, "fail_on_match");
        let pass_on_match = flag(spec, "pass_on_match");
        let negate = flag(spec, "negate_match");
        let options = MatchOptions {
            or_empty: flag(spec, "or_empty"),
            partial_match: flag(spec, "partial_match"),
        };
        let expected = match spec.get("value") {
            Some(value) => expected_values(value, true),
            None if fail_on_match || pass_on_match => Some(Vec::new()),
            None => None,
        };
        let Some(expected) = expected else {
            results.add(CheckResult::fail(spec_error(&description, "value")));
            return;
        };

        let mut counts = Counts::default();
        let entries = hierarchy
            .get(table)
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter(|(_, node)| node.is_object());

        for (directive, entry) in entries {
            if !selector.matches(directive, negate) {
                continue;
            }
            let name = directive
                .split_once(' ')
                .map(|(_, rest)| rest)
                .unwrap_or(directive.as_str())
                .trim_matches('"');
            log_debug!("Entry selected", "check" => self.name(), "entry" => name, "description" => &description);
            counts.matched += 1;

            if fail_on_match {
                results.add(CheckResult::fail(format!("{} ({} found)", description, name)));
                counts.failed += 1;
            } else if pass_on_match {
                results.add(CheckResult::pass(format!("{} ({} found)", description, name)));
                counts.passed += 1;
            } else if validate_setting(entry, setting, &expected, options) {
                counts.passed += 1;
            } else {
                counts.failed += 1;
            }
        }

        if fail_on_match {
            if counts.matched == 0 {
                results.add(CheckResult::pass(format!("{} (none found)", description)));
            }
            return;
        }
        results.add(threshold.summarize(&description, counts));
    }
}

impl CheckPlugin for EachEntryCheck {
    fn name(&self) -> &str {
        "fg_each"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(
            ParamKind::List,
            "setting_specs",
            "<type:policy|addr|addr6|addrgrp|addr6grp|admin|tacuser|usergroup>, <select:all|id:<id>[|<id>[|...]]>, setting, value[|value[|...]], or_empty:False, partial_match:False, fail_on_match:False, pass_on_match:False, pass_threshhold:<all|none|any|[0-9]+>, negate_match:False, description:<{type}:{select}:{setting}>",
        )]
    }

    fn requires(&self) -> Vec<String> {
        vec![CONFIGURATION_TAG.to_string()]
    }

    fn description(&self) -> &str {
        "Evaluates a setting on every selected entry of a configuration table"
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        let specs = spec_list(envelope, &["setting_specs", "setting_spec"], self.name())?;
        let hierarchy = configuration(envelope, self.name())?
            .get("hierarchy")
            .ok_or_else(|| PluginError::execution(self.name(), "configuration has no hierarchy"))?;

        let mut results = Results::new();
        for spec in specs {
            self.evaluate_spec(hierarchy, spec, &mut results);
        }
        Ok(results.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framease_base::results::Status;
    use serde_json::json;

    fn envelope(specs: Value) -> Value {
        json!({
            "fgt_cli_configuration": {
                "hierarchy": {
                    "config firewall policy": {
                        "edit 1": {"action": "accept", "logtraffic": "all"},
                        "edit 2": {"action": "accept", "logtraffic": "utm"},
                        "edit 3": {"action": "deny"}
                    },
                    "config system admin": {
                        "edit \"admin\"": {"accprofile": "\"super_admin\""},
                        "edit \"auditor\"": {"accprofile": "\"read_only\""}
                    }
                }
            },
            "parameters": {"setting_specs": specs}
        })
    }

    fn run(specs: Value) -> Vec<(String, Status)> {
        match EachEntryCheck::new().check(&envelope(specs)).unwrap() {
            CheckOutput::Results(results) => results
                .iter()
                .map(|r| (r.description.clone(), r.validation_status))
                .collect(),
            CheckOutput::Legacy(value) => panic!("unexpected legacy output {}", value),
        }
    }

    #[test]
    fn test_threshold_all() {
        let results = run(json!([
            {"type": "policy", "setting": "logtraffic", "value": "all|utm"},
            {"type": "policy", "setting": "logtraffic", "value": "all"}
        ]));
        assert_eq!(
            results,
            vec![
                ("policy:all:logtraffic (2 pass/1 fail/3 matched)".to_string(), Status::Fail),
                ("policy:all:logtraffic (1 pass/2 fail/3 matched)".to_string(), Status::Fail),
            ]
        );

        let results = run(json!([
            {"type": "policy", "select": "id:1|2", "setting": "logtraffic", "value": "all|utm"}
        ]));
        assert_eq!(
            results,
            vec![("policy:id:1|2:logtraffic (2 pass/0 fail/2 matched)".to_string(), Status::Pass)]
        );
    }

    #[test]
    fn test_threshold_any_none_and_count() {
        let results = run(json!([
            {"type": "policy", "setting": "action", "value": "deny", "pass_threshhold": "any", "description": "any"},
            {"type": "policy", "setting": "logtraffic", "value": "disable", "pass_threshhold": "none", "description": "none"},
            {"type": "policy", "setting": "action", "value": "accept", "pass_threshhold": "1", "description": "gt1"},
            {"type": "policy", "setting": "action", "value": "accept", "pass_threshhold": 2, "description": "gt2"},
            {"type": "policy", "setting": "action", "value": "accept", "pass_threshhold": "0", "description": "zero"}
        ]));
        assert_eq!(
            results,
            vec![
                ("any (1 pass/2 fail/3 matched)".to_string(), Status::Pass),
                ("none (3 pass/0 fail/3 matched)".to_string(), Status::Pass),
                ("gt1 (2 pass/1 fail/3 matched)".to_string(), Status::Pass),
                ("gt2 (2 pass/1 fail/3 matched)".to_string(), Status::Fail),
                ("zero (1 pass/2 fail/3 matched)".to_string(), Status::Fail),
            ]
        );
    }

    #[test]
    fn test_fail_on_match() {
        let results = run(json!([
            {"type": "admin", "select": "id:auditor", "setting": "", "fail_on_match": true, "description": "no auditor"},
            {"type": "admin", "select": "id:guest", "setting": "", "fail_on_match": true, "description": "no guest"}
        ]));
        assert_eq!(
            results,
            vec![
                ("no auditor (auditor found)".to_string(), Status::Fail),
                ("no guest (none found)".to_string(), Status::Pass),
            ]
        );
    }

    #[test]
    fn test_pass_on_match_and_negation() {
        let results = run(json!([
            {"type": "admin", "select": "id:admin", "pass_on_match": true, "description": "admin"},
            {"type": "admin", "select": "id:admin", "negate_match": true, "setting": "accprofile", "value": "read_only", "description": "others"}
        ]));
        assert_eq!(
            results,
            vec![
                ("admin (admin found)".to_string(), Status::Pass),
                ("admin (1 pass/0 fail/1 matched)".to_string(), Status::Pass),
                ("others (1 pass/0 fail/1 matched)".to_string(), Status::Pass),
            ]
        );
    }

    #[test]
    fn test_spec_errors() {
        let results = run(json!([
            {"type": "vip", "setting": "a", "value": "b"},
            {"type": "policy", "select": "first", "setting": "a", "value": "b"},
            {"type": "policy", "setting": "a", "value": "b", "pass_threshhold": "-1"},
            {"type": "policy", "setting": "a"}
        ]));
        assert_eq!(
            results,
            vec![
                ("vip:all:a [ERROR: type]".to_string(), Status::Fail),
                ("policy:first:a [ERROR: select]".to_string(), Status::Fail),
                ("policy:all:a [ERROR: pass_threshhold]".to_string(), Status::Fail),
                ("policy:all:a [ERROR: value]".to_string(), Status::Fail),
            ]
        );
    }

    #[test]
    fn test_absent_table_matches_nothing() {
        let results = run(json!([
            {"type": "addr6grp", "setting": "member", "value": "x"},
            {"type": "tacuser", "fail_on_match": true, "description": "no tacacs users"}
        ]));
        assert_eq!(
            results,
            vec![
                ("addr6grp:all:member (0 pass/0 fail/0 matched)".to_string(), Status::Fail),
                ("no tacacs users (none found)".to_string(), Status::Pass),
            ]
        );
    }
}
