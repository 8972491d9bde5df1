//! Configurable plugins for unit tests

use crate::plugins::errors::PluginError;
use crate::plugins::traits::{CheckPlugin, DataSourcePlugin};
use crate::results::{CheckOutput, CheckResult, Results, Status};
use crate::types::{CapabilityData, ParamSpec};
use serde_json::Value;

pub(crate) struct StaticSource {
    name: String,
    provides: Vec<String>,
    requires: Vec<String>,
    output: CapabilityData,
    fail: bool,
}

impl StaticSource {
    /// Emits each provided tag with the plugin name as its value
    pub(crate) fn new(name: &str, provides: &[&str], requires: &[&str]) -> Self {
        let output = provides
            .iter()
            .map(|tag| (tag.to_string(), Value::String(name.to_string())))
            .collect();
        Self {
            name: name.to_string(),
            provides: provides.iter().map(|s| s.to_string()).collect(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            output,
            fail: false,
        }
    }

    pub(crate) fn with_output(mut self, output: Value) -> Self {
        if let Value::Object(map) = output {
            self.output = map;
        }
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl DataSourcePlugin for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn provides(&self) -> Vec<String> {
        self.provides.clone()
    }

    fn requires(&self) -> Vec<String> {
        self.requires.clone()
    }

    fn process(&self, _bag: &CapabilityData) -> Result<CapabilityData, PluginError> {
        if self.fail {
            return Err(PluginError::execution(&self.name, "configured to fail"));
        }
        Ok(self.output.clone())
    }
}

pub(crate) enum CheckBehavior {
    Status(Status),
    Legacy(Value),
    /// One PASS result carrying the envelope as its only detail
    Echo,
    Error,
    Panic,
}

pub(crate) struct StaticCheck {
    name: String,
    requires: Vec<String>,
    behavior: CheckBehavior,
}

impl StaticCheck {
    pub(crate) fn new(name: &str, requires: &[&str], behavior: CheckBehavior) -> Self {
        Self {
            name: name.to_string(),
            requires: requires.iter().map(|s| s.to_string()).collect(),
            behavior,
        }
    }

    pub(crate) fn passing(name: &str, requires: &[&str]) -> Self {
        Self::new(name, requires, CheckBehavior::Status(Status::Pass))
    }
}

impl CheckPlugin for StaticCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    fn requires(&self) -> Vec<String> {
        self.requires.clone()
    }

    fn check(&self, envelope: &Value) -> Result<CheckOutput, PluginError> {
        match &self.behavior {
            CheckBehavior::Status(status) => {
                let mut results = Results::new();
                results.add(CheckResult::new(self.name.clone(), *status));
                Ok(results.into())
            }
            CheckBehavior::Legacy(value) => Ok(CheckOutput::Legacy(value.clone())),
            CheckBehavior::Echo => {
                let mut result = CheckResult::new(self.name.clone(), Status::Pass);
                result.add_detail(envelope.clone());
                let mut results = Results::new();
                results.add(result);
                Ok(results.into())
            }
            CheckBehavior::Error => Err(PluginError::execution(&self.name, "configured to fail")),
            CheckBehavior::Panic => panic!("check '{}' configured to panic", self.name),
        }
    }
}
