//! Test suites and their ordered cases

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

fn empty_parameters() -> Value {
    Value::Object(Default::default())
}

/// One check plus its stored parameters at a position in a suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteCase {
    pub sequence: u32,
    pub plugin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// JSON object, or JSON text of one
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestSuite {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    cases: Vec<SuiteCase>,
}

impl TestSuite {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_case(
        &mut self,
        plugin: impl Into<String>,
        sequence: u32,
        parameters: Value,
    ) -> &mut Self {
        self.cases.push(SuiteCase {
            sequence,
            plugin: plugin.into(),
            name: String::new(),
            parameters,
        });
        self
    }

    /// Cases in insertion order
    pub fn cases(&self) -> &[SuiteCase] {
        &self.cases
    }

    /// Cases by ascending sequence; ties keep insertion order
    pub fn ordered_cases(&self) -> Vec<&SuiteCase> {
        let mut ordered: Vec<&SuiteCase> = self.cases.iter().collect();
        ordered.sort_by_key(|case| case.sequence);
        ordered
    }

    /// Distinct check plugins referenced by the suite
    pub fn plugins(&self) -> BTreeSet<&str> {
        self.cases.iter().map(|case| case.plugin.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordered_cases() {
        let mut suite = TestSuite::new("baseline").with_name("Baseline");
        suite
            .add_case("manual", 3, json!({}))
            .add_case("fg_version", 1, json!({"fw_version": "v7.2.5"}))
            .add_case("fg_setting", 2, json!({}));

        let order: Vec<u32> = suite.ordered_cases().iter().map(|c| c.sequence).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(suite.plugins().len(), 3);
        assert_eq!(suite.name, "Baseline");
    }

    #[test]
    fn test_parameters_default_to_object() {
        let suite: TestSuite = serde_json::from_value(json!({
            "id": "s1",
            "cases": [{"sequence": 1, "plugin": "manual"}]
        }))
        .unwrap();
        assert_eq!(suite.cases()[0].parameters, json!({}));
    }
}
