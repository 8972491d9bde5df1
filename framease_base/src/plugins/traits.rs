//! Plugin traits for data-source resolution and check evaluation
//!
//! Both kinds of plugin exchange loosely-typed JSON at their boundary: data
//! sources read and extend the capability bag, checks read an envelope built
//! from that bag plus the case's stored parameters.

use crate::plugins::errors::PluginError;
use crate::results::CheckOutput;
use crate::types::{CapabilityData, ParamSpec};
use serde_json::Value;

// ============================================================================
// Data Source Plugins
// ============================================================================

/// Turns device-specific configuration into capability data
pub trait DataSourcePlugin: Send + Sync {
    /// Registry name, referenced by stored device configuration
    fn name(&self) -> &str;

    /// Capability tags this plugin adds to the bag
    fn provides(&self) -> Vec<String>;

    /// Input names that must be present in the bag before `process` runs.
    ///
    /// A file-typed input is satisfied either by the raw value or by its
    /// expanded `filedata:<name>` lines.
    fn requires(&self) -> Vec<String>;

    /// Produce the partial bag this plugin contributes.
    ///
    /// Must depend only on `bag`; the pipeline merges the returned keys over
    /// the running bag.
    fn process(&self, bag: &CapabilityData) -> Result<CapabilityData, PluginError>;

    fn description(&self) -> &str {
        ""
    }
}

// ============================================================================
// Check Plugins
// ============================================================================

/// Evaluates capability data against a case's stored parameters
pub trait CheckPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Parameter shape, used to build input forms
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Capability tags the envelope must contain
    fn requires(&self) -> Vec<String>;

    /// Run the check against `envelope`.
    ///
    /// The envelope is a JSON object holding every key of the resolved
    /// capability bag plus a `parameters` object. New plugins return
    /// [`CheckOutput::Results`]; older shapes go through
    /// [`CheckOutput::Legacy`] and are normalized by the evaluator.
    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError>;

    fn description(&self) -> &str {
        ""
    }
}

// ============================================================================
// Envelope helpers
// ============================================================================

/// The `parameters` object of a check envelope
pub fn envelope_parameters(envelope: &Value) -> Option<&serde_json::Map<String, Value>> {
    envelope.get("parameters").and_then(Value::as_object)
}

/// First of `names` present in the envelope parameters
pub fn parameter<'a>(envelope: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let params = envelope_parameters(envelope)?;
    names.iter().find_map(|name| params.get(*name))
}

/// Read a boolean flag that may have been stored as a string
pub fn flag(spec: &Value, key: &str) -> bool {
    match spec.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_aliases() {
        let envelope = json!({"parameters": {"setting_spec": [1]}});
        assert_eq!(
            parameter(&envelope, &["setting_specs", "setting_spec"]),
            Some(&json!([1]))
        );
        assert!(parameter(&envelope, &["missing"]).is_none());
        assert!(parameter(&json!({}), &["setting_spec"]).is_none());
    }

    #[test]
    fn test_flag_coercion() {
        let spec = json!({"a": true, "b": "True", "c": 0, "d": "no"});
        assert!(flag(&spec, "a"));
        assert!(flag(&spec, "b"));
        assert!(!flag(&spec, "c"));
        assert!(!flag(&spec, "d"));
        assert!(!flag(&spec, "absent"));
    }
}
