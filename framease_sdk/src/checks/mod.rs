//! Check plugins
//!
//! Evaluate capability data against a case's parameters and report one
//! [`CheckResult`](framease_base::results::CheckResult) per declared spec.

pub mod dict_key;
pub mod each_entry;
pub mod manual;
pub mod ping;
pub mod setting;
pub mod version;

pub use dict_key::DictKeyCheck;
pub use each_entry::EachEntryCheck;
pub use manual::ManualCheck;
pub use ping::PingCheck;
pub use setting::SettingCheck;
pub use version::VersionCheck;

use crate::datasources::CONFIGURATION_TAG;
use framease_base::plugins::{parameter, PluginError};
use serde_json::Value;

/// Suffix marking a spec the check could not interpret
pub(crate) fn spec_error(description: &str, field: &str) -> String {
    format!("{} [ERROR: {}]", description, field)
}

/// Parsed configuration published by `fortigate_offline`
pub(crate) fn configuration<'a>(envelope: &'a Value, plugin: &str) -> Result<&'a Value, PluginError> {
    envelope
        .get(CONFIGURATION_TAG)
        .filter(|value| value.is_object())
        .ok_or_else(|| PluginError::missing_input(plugin, CONFIGURATION_TAG))
}

/// The spec list under the first present parameter name
pub(crate) fn spec_list<'a>(
    envelope: &'a Value,
    names: &[&str],
    plugin: &str,
) -> Result<&'a Vec<Value>, PluginError> {
    match parameter(envelope, names) {
        Some(Value::Array(specs)) => Ok(specs),
        Some(_) => Err(PluginError::execution(
            plugin,
            format!("parameter '{}' must be a list", names[0]),
        )),
        None => Err(PluginError::execution(
            plugin,
            format!("missing parameter '{}'", names[0]),
        )),
    }
}

/// Split on `|` not preceded by `\`; escaped pipes become literal
pub(crate) fn split_alternatives(value: &str) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => alternatives.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    alternatives.push(current);
    alternatives
}

/// Expected values from a spec: a list of strings, or one string
pub(crate) fn expected_values(value: &Value, split_pipes: bool) -> Option<Vec<String>> {
    match value {
        Value::String(s) if split_pipes => Some(split_alternatives(s)),
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::Number(n) => Some(vec![n.to_string()]),
        Value::Bool(b) => Some(vec![b.to_string()]),
        _ => None,
    }
}

/// How a stored setting is matched against the expected values
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MatchOptions {
    pub or_empty: bool,
    pub partial_match: bool,
}

/// True when `context[key]` equals one of `expected` (with or without its
/// surrounding quotes), contains one when partial matching, or is absent
/// and `or_empty` is set
pub(crate) fn validate_setting(
    context: &Value,
    key: &str,
    expected: &[String],
    options: MatchOptions,
) -> bool {
    let Some(actual) = context.get(key) else {
        return options.or_empty;
    };
    let Some(actual) = actual.as_str() else {
        return false;
    };
    expected.iter().any(|value| {
        actual == value
            || actual.trim_matches('"') == value
            || (options.partial_match && actual.contains(value.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_alternatives() {
        assert_eq!(split_alternatives("enable"), vec!["enable"]);
        assert_eq!(split_alternatives("a|b|c"), vec!["a", "b", "c"]);
        assert_eq!(split_alternatives(r"a\|b|c"), vec!["a|b", "c"]);
        assert_eq!(split_alternatives(""), vec![""]);
    }

    #[test]
    fn test_validate_setting() {
        let context = json!({"accprofile": "\"super_admin\"", "status": "enable"});
        let exact = MatchOptions::default();

        assert!(validate_setting(&context, "accprofile", &["\"super_admin\"".into()], exact));
        assert!(validate_setting(&context, "accprofile", &["super_admin".into()], exact));
        assert!(!validate_setting(&context, "accprofile", &["super".into()], exact));
        assert!(validate_setting(
            &context,
            "accprofile",
            &["super".into()],
            MatchOptions {
                partial_match: true,
                ..exact
            }
        ));
        assert!(validate_setting(
            &context,
            "status",
            &["disable".into(), "enable".into()],
            exact
        ));

        assert!(!validate_setting(&context, "missing", &["x".into()], exact));
        assert!(validate_setting(
            &context,
            "missing",
            &["x".into()],
            MatchOptions {
                or_empty: true,
                ..exact
            }
        ));
    }

    #[test]
    fn test_expected_values() {
        assert_eq!(
            expected_values(&json!("a|b"), true),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(expected_values(&json!("a|b"), false), Some(vec!["a|b".to_string()]));
        assert_eq!(
            expected_values(&json!(["x", "y"]), false),
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(expected_values(&json!(443), false), Some(vec!["443".to_string()]));
        assert_eq!(expected_values(&json!({}), false), None);
    }
}
