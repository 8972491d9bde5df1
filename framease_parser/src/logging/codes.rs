//! Consolidated log codes and classification system
//!
//! Single source of truth for every code emitted by the parser, the plugin
//! layer, the data-source pipeline and the run orchestrator, together with
//! the behavioral metadata attached to each code.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration dump loading codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Configuration hierarchy parser codes
pub mod parser {
    use super::Code;

    pub const UNBALANCED_NESTING: Code = Code::new("P001");
    pub const SET_OUTSIDE_CONTEXT: Code = Code::new("P002");
    pub const CONTEXT_TOO_DEEP: Code = Code::new("P003");
    pub const UNCLOSED_CONTEXT: Code = Code::new("P004");
    pub const EMPTY_SET_DIRECTIVE: Code = Code::new("P005");
    pub const LOGICAL_LINE_TOO_LONG: Code = Code::new("P006");
}

/// Plugin registry and plugin invocation codes
pub mod plugin {
    use super::Code;

    pub const PLUGIN_NOT_FOUND: Code = Code::new("K001");
    pub const DUPLICATE_PLUGIN: Code = Code::new("K002");
    pub const INVALID_CAPABILITY_TAG: Code = Code::new("K003");
    pub const PLUGIN_EXECUTION_ERROR: Code = Code::new("K004");
    pub const PLUGIN_PANIC: Code = Code::new("K005");
    pub const MALFORMED_RESULT: Code = Code::new("K006");
    pub const INVALID_PARAMETERS: Code = Code::new("K007");
    pub const COMMAND_FAILED: Code = Code::new("K008");
}

/// Data-source pipeline codes
pub mod pipeline {
    use super::Code;

    pub const MISSING_INPUT: Code = Code::new("D001");
    pub const FILE_EXPANSION_FAILED: Code = Code::new("D002");
    pub const PIPELINE_ABORTED: Code = Code::new("D003");
}

/// Validation run lifecycle codes
pub mod run {
    use super::Code;

    pub const RUN_ALREADY_RUNNING: Code = Code::new("R001");
    pub const RUN_FAILED: Code = Code::new("R002");
    pub const RUN_PANICKED: Code = Code::new("R003");
    pub const CASE_FAILED: Code = Code::new("R004");
}

/// Run store and engine configuration codes
pub mod store {
    use super::Code;

    pub const RUN_NOT_FOUND: Code = Code::new("S001");
    pub const DEVICE_NOT_FOUND: Code = Code::new("S002");
    pub const SUITE_NOT_FOUND: Code = Code::new("S003");
    pub const STORAGE_FAILURE: Code = Code::new("S004");
    pub const INVALID_CONFIGURATION: Code = Code::new("S005");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const PARSE_COMPLETE: Code = Code::new("I010");
    pub const FILE_LOADED: Code = Code::new("I011");
    pub const REGISTRY_READY: Code = Code::new("I020");
    pub const DATA_SOURCE_COMPLETE: Code = Code::new("I030");
    pub const PIPELINE_COMPLETE: Code = Code::new("I031");
    pub const CASE_EVALUATED: Code = Code::new("I040");
    pub const RUN_COMPLETED: Code = Code::new("I050");
    pub const RUN_DISPATCHED: Code = Code::new("I051");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type MetadataRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

const METADATA_TABLE: &[MetadataRow] = &[
    // System
    (
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Internal engine error",
        "Report the failure with the accompanying context",
    ),
    (
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Engine initialization failure",
        "Check logging and engine configuration",
    ),
    // File processing
    (
        "E005",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Configuration dump not found",
        "Verify the file path recorded for the data source",
    ),
    (
        "E007",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Configuration dump exceeds the maximum size",
        "Split the dump or raise the engine file size limit",
    ),
    (
        "E009",
        "FileProcessing",
        Severity::High,
        false,
        false,
        "Permission denied while reading file",
        "Check file permissions for the engine user",
    ),
    (
        "E010",
        "FileProcessing",
        Severity::Medium,
        false,
        false,
        "File is not valid UTF-8",
        "Re-export the configuration as UTF-8 text",
    ),
    (
        "E011",
        "FileProcessing",
        Severity::High,
        true,
        false,
        "I/O error while reading file",
        "Retry once the storage backend is healthy",
    ),
    // Parser
    (
        "P001",
        "Parser",
        Severity::High,
        false,
        true,
        "More next/end directives than config/edit directives",
        "Inspect the dump for truncation or manual edits",
    ),
    (
        "P002",
        "Parser",
        Severity::High,
        false,
        true,
        "set directive outside any open context",
        "Inspect the dump for a missing config or edit line",
    ),
    (
        "P003",
        "Parser",
        Severity::High,
        false,
        true,
        "Context nesting exceeds the maximum depth",
        "Inspect the dump for missing next/end directives",
    ),
    (
        "P004",
        "Parser",
        Severity::Low,
        true,
        false,
        "Contexts left open at end of input",
        "Verify the dump was captured completely",
    ),
    (
        "P005",
        "Parser",
        Severity::Low,
        true,
        false,
        "set directive without a key",
        "No action required; the line is skipped",
    ),
    (
        "P006",
        "Parser",
        Severity::Medium,
        false,
        true,
        "Quoted continuation exceeds the maximum logical line length",
        "Inspect the dump for an unterminated quoted value",
    ),
    // Plugin
    (
        "K001",
        "Plugin",
        Severity::High,
        false,
        false,
        "Plugin referenced by stored configuration is not registered",
        "Register the plugin or fix the stored plugin name",
    ),
    (
        "K002",
        "Plugin",
        Severity::High,
        false,
        true,
        "Plugin registered twice under the same name",
        "Remove the duplicate registration",
    ),
    (
        "K003",
        "Plugin",
        Severity::Medium,
        false,
        true,
        "Plugin declares an invalid capability tag",
        "Capability tags must be lowercase identifiers",
    ),
    (
        "K004",
        "Plugin",
        Severity::High,
        true,
        false,
        "Plugin raised an error while processing",
        "Review plugin input data and parameters",
    ),
    (
        "K005",
        "Plugin",
        Severity::High,
        true,
        false,
        "Plugin panicked while processing",
        "Review plugin input data and report the plugin defect",
    ),
    (
        "K006",
        "Plugin",
        Severity::Medium,
        true,
        false,
        "Plugin output could not be normalized into results",
        "Update the plugin to return structured results",
    ),
    (
        "K007",
        "Plugin",
        Severity::Medium,
        true,
        false,
        "Case parameters are not a JSON object",
        "Fix the stored case parameters",
    ),
    (
        "K008",
        "Plugin",
        Severity::Medium,
        true,
        false,
        "External command failed or timed out",
        "Check the command whitelist and host connectivity",
    ),
    // Pipeline
    (
        "D001",
        "Pipeline",
        Severity::High,
        false,
        false,
        "Data source required input is missing",
        "Configure the missing input on the device data source",
    ),
    (
        "D002",
        "Pipeline",
        Severity::High,
        false,
        false,
        "File-typed input could not be expanded",
        "Verify the referenced file exists and is readable",
    ),
    (
        "D003",
        "Pipeline",
        Severity::High,
        false,
        false,
        "Capability resolution aborted",
        "Fix the failing data source before rerunning",
    ),
    // Run
    (
        "R001",
        "Run",
        Severity::Medium,
        true,
        false,
        "Run is already executing",
        "Wait for the in-flight execution to finish",
    ),
    (
        "R002",
        "Run",
        Severity::High,
        true,
        false,
        "Run failed before case evaluation",
        "Inspect the pipeline error and rerun",
    ),
    (
        "R003",
        "Run",
        Severity::Critical,
        true,
        false,
        "Run panicked during execution",
        "Report the failure; prior results were preserved",
    ),
    (
        "R004",
        "Run",
        Severity::Medium,
        true,
        false,
        "Case evaluation failed",
        "Review the case parameters and plugin logs",
    ),
    // Store
    (
        "S001",
        "Store",
        Severity::High,
        false,
        false,
        "Validation run not found",
        "Verify the run identifier",
    ),
    (
        "S002",
        "Store",
        Severity::High,
        false,
        false,
        "Device not found",
        "Verify the device identifier",
    ),
    (
        "S003",
        "Store",
        Severity::High,
        false,
        false,
        "Suite not found",
        "Verify the suite identifier",
    ),
    (
        "S004",
        "Store",
        Severity::High,
        true,
        false,
        "Storage backend failure",
        "Retry once the storage backend is healthy",
    ),
    (
        "S005",
        "Store",
        Severity::High,
        false,
        true,
        "Engine configuration is invalid",
        "Fix the engine configuration file",
    ),
    // Success
    (
        "I001",
        "System",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "No action required",
    ),
    (
        "I010",
        "Parser",
        Severity::Low,
        true,
        false,
        "Configuration hierarchy parsed",
        "No action required",
    ),
    (
        "I011",
        "FileProcessing",
        Severity::Low,
        true,
        false,
        "Configuration dump loaded",
        "No action required",
    ),
    (
        "I020",
        "Plugin",
        Severity::Low,
        true,
        false,
        "Plugin registry ready",
        "No action required",
    ),
    (
        "I030",
        "Pipeline",
        Severity::Low,
        true,
        false,
        "Data source processed",
        "No action required",
    ),
    (
        "I031",
        "Pipeline",
        Severity::Low,
        true,
        false,
        "Capability data resolved",
        "No action required",
    ),
    (
        "I040",
        "Run",
        Severity::Low,
        true,
        false,
        "Case evaluated",
        "No action required",
    ),
    (
        "I050",
        "Run",
        Severity::Low,
        true,
        false,
        "Run completed",
        "No action required",
    ),
    (
        "I051",
        "Run",
        Severity::Low,
        true,
        false,
        "Run dispatched",
        "No action required",
    ),
];

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

    REGISTRY.get_or_init(|| {
        METADATA_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, halt, description, action)| {
                    (
                        code,
                        ErrorMetadata::new(
                            code,
                            category,
                            severity,
                            recoverable,
                            halt,
                            description,
                            action,
                        ),
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_has_metadata() {
        let all = [
            system::INTERNAL_ERROR,
            file_processing::FILE_TOO_LARGE,
            parser::UNBALANCED_NESTING,
            parser::UNCLOSED_CONTEXT,
            plugin::PLUGIN_NOT_FOUND,
            plugin::MALFORMED_RESULT,
            pipeline::MISSING_INPUT,
            run::RUN_PANICKED,
            store::RUN_NOT_FOUND,
            success::RUN_COMPLETED,
        ];
        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_defaults_for_unknown_code() {
        assert_eq!(get_severity("X999"), Severity::Medium);
        assert!(is_recoverable("X999"));
        assert!(!requires_halt("X999"));
        assert_eq!(get_category("X999"), "Unknown");
    }

    #[test]
    fn test_parser_codes_halt() {
        assert!(requires_halt(parser::UNBALANCED_NESTING.as_str()));
        assert!(!requires_halt(parser::UNCLOSED_CONTEXT.as_str()));
        assert_eq!(get_category(parser::SET_OUTSIDE_CONTEXT.as_str()), "Parser");
    }
}
