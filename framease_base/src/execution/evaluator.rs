//! Check evaluation for a single suite case
//!
//! Builds the plugin envelope (capability bag plus the case's `parameters`),
//! invokes the check and normalizes its output. Every failure is contained:
//! the caller always gets a [`CaseOutcome`], with empty results and the error
//! when something went wrong.

use crate::execution::error::EvaluationError;
use crate::plugins::{panic_message, CapabilityRegistry, CheckPlugin, PluginError};
use crate::resolution::expand_file_markers;
use crate::results::{CheckOutput, Results};
use crate::types::{CapabilityData, SuiteCase};
use framease_parser::logging::codes;
use framease_parser::FileProcessor;
use framease_parser::{log_debug, log_error, log_success};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Envelope key holding the case's own parameters
pub const PARAMETERS_KEY: &str = "parameters";

/// Results of one case plus the error that cut it short, if any
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub results: Results,
    pub error: Option<EvaluationError>,
}

impl CaseOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct CheckEvaluator {
    registry: Arc<CapabilityRegistry>,
    files: FileProcessor,
    isolate_panics: bool,
}

impl CheckEvaluator {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            files: FileProcessor::new(),
            isolate_panics: true,
        }
    }

    pub fn with_file_processor(mut self, files: FileProcessor) -> Self {
        self.files = files;
        self
    }

    pub fn with_panic_isolation(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Evaluate a case, logging and containing any failure
    pub fn evaluate(&self, case: &SuiteCase, data: &CapabilityData) -> CaseOutcome {
        match self.try_evaluate(case, data) {
            Ok(results) => {
                log_success!(codes::success::CASE_EVALUATED, "Case evaluated",
                    "sequence" => case.sequence,
                    "plugin" => &case.plugin,
                    "results" => results.len(),
                    "passed" => results.pass_count());
                CaseOutcome {
                    results,
                    error: None,
                }
            }
            Err(e) => {
                log_error!(e.error_code(), "Case evaluation failed",
                    "sequence" => case.sequence,
                    "plugin" => &case.plugin,
                    "error" => &e);
                CaseOutcome {
                    results: Results::new(),
                    error: Some(e),
                }
            }
        }
    }

    pub fn try_evaluate(
        &self,
        case: &SuiteCase,
        data: &CapabilityData,
    ) -> Result<Results, EvaluationError> {
        let plugin = self.registry.check(&case.plugin)?;
        let envelope = self.build_envelope(case, data)?;

        for tag in plugin.requires() {
            if !envelope.contains_key(&tag) {
                return Err(PluginError::missing_input(plugin.name(), &tag).into());
            }
        }

        let envelope = Value::Object(envelope);
        let output = self.invoke(plugin, &envelope)?;
        output
            .normalize(plugin.name())
            .map_err(|source| EvaluationError::Malformed {
                plugin: plugin.name().to_string(),
                source,
            })
    }

    /// Capability bag plus `parameters`, with file markers expanded at both
    /// levels independently
    pub fn build_envelope(
        &self,
        case: &SuiteCase,
        data: &CapabilityData,
    ) -> Result<CapabilityData, EvaluationError> {
        let mut parameters = case_parameters(case)?;
        expand_file_markers(&mut parameters, &self.files)?;

        let mut envelope = data.clone();
        expand_file_markers(&mut envelope, &self.files)?;
        envelope.insert(PARAMETERS_KEY.to_string(), Value::Object(parameters));

        log_debug!("Built check envelope", "plugin" => &case.plugin, "keys" => envelope.len());
        Ok(envelope)
    }

    fn invoke(
        &self,
        plugin: &dyn CheckPlugin,
        envelope: &Value,
    ) -> Result<CheckOutput, EvaluationError> {
        if !self.isolate_panics {
            return Ok(plugin.check(envelope)?);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| plugin.check(envelope))) {
            Ok(result) => Ok(result?),
            Err(payload) => Err(EvaluationError::Panicked {
                plugin: plugin.name().to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

/// Stored parameters as an object; JSON text is parsed, empty means none
pub fn case_parameters(case: &SuiteCase) -> Result<CapabilityData, EvaluationError> {
    let invalid = |reason: String| EvaluationError::InvalidParameters {
        sequence: case.sequence,
        reason,
    };
    match &case.parameters {
        Value::Null => Ok(CapabilityData::new()),
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) if text.trim().is_empty() => Ok(CapabilityData::new()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(invalid(format!(
                "expected a JSON object, got {}",
                crate::results::value_kind(&other)
            ))),
            Err(e) => Err(invalid(format!("not valid JSON: {}", e))),
        },
        other => Err(invalid(format!(
            "expected a JSON object, got {}",
            crate::results::value_kind(other)
        ))),
    }
}
