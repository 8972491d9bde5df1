//! Offline FortiGate configuration source
//!
//! Parses an uploaded configuration dump into the `fgt_cli_configuration`
//! capability: `{hierarchy, config, interfaces, admin_accounts, fw_version,
//! unclosed_contexts}`.

use framease_base::plugins::{DataSourcePlugin, PluginError};
use framease_base::resolution::input_lines;
use framease_base::types::CapabilityData;
use framease_parser::config::ParserPreferences;
use framease_parser::{log_warning, HierarchyParser};
use framease_parser::logging::codes;

pub const FILE_INPUT: &str = "file";
pub const CONFIGURATION_TAG: &str = "fgt_cli_configuration";

pub struct FortigateOfflineSource {
    preferences: ParserPreferences,
}

impl FortigateOfflineSource {
    pub fn new() -> Self {
        Self::with_preferences(ParserPreferences::default())
    }

    pub fn with_preferences(preferences: ParserPreferences) -> Self {
        Self { preferences }
    }
}

impl Default for FortigateOfflineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourcePlugin for FortigateOfflineSource {
    fn name(&self) -> &str {
        "fortigate_offline"
    }

    fn provides(&self) -> Vec<String> {
        vec![CONFIGURATION_TAG.to_string()]
    }

    fn requires(&self) -> Vec<String> {
        vec![FILE_INPUT.to_string()]
    }

    fn description(&self) -> &str {
        "Parses an offline FortiGate configuration dump"
    }

    fn process(&self, bag: &CapabilityData) -> Result<CapabilityData, PluginError> {
        let lines = input_lines(bag, FILE_INPUT)
            .ok_or_else(|| PluginError::missing_input(self.name(), FILE_INPUT))?;

        let hierarchy = HierarchyParser::with_preferences(self.preferences.clone())
            .parse_lines(lines.iter().map(String::as_str))
            .map_err(|e| PluginError::execution(self.name(), e.to_string()))?;

        if !hierarchy.is_complete() {
            log_warning!(code = codes::parser::UNCLOSED_CONTEXT,
                "Configuration dump ends inside open contexts",
                "plugin" => self.name(),
                "open_contexts" => hierarchy.unclosed_contexts().len());
        }

        let configuration = hierarchy
            .to_capability_json()
            .map_err(|e| PluginError::execution(self.name(), e.to_string()))?;

        let mut output = CapabilityData::new();
        output.insert(CONFIGURATION_TAG.to_string(), configuration);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const ADMIN_DUMP: &str =
        "config system admin\nedit \"admin\"\nset accprofile \"super_admin\"\nnext\nend\n";

    fn bag(value: serde_json::Value) -> CapabilityData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_expanded_file_lines() {
        let lines: Vec<&str> = ADMIN_DUMP.lines().collect();
        let output = FortigateOfflineSource::new()
            .process(&bag(json!({
                "file": "/uploads/fw1.conf",
                "type:file": "file",
                "filedata:file": lines,
            })))
            .unwrap();

        let configuration = &output[CONFIGURATION_TAG];
        assert_eq!(
            configuration["hierarchy"],
            json!({"config system admin": {"edit \"admin\"": {"accprofile": "\"super_admin\""}}})
        );
        assert!(configuration["admin_accounts"].get("admin").is_some());
    }

    #[test]
    fn test_inline_text_and_version() {
        let dump = format!(
            "#config-version=FGT60F-7.2.5-FW-build1517-230606:opmode=0\n{}",
            ADMIN_DUMP
        );
        let output = FortigateOfflineSource::new()
            .process(&bag(json!({ "file": dump })))
            .unwrap();
        assert_eq!(output[CONFIGURATION_TAG]["fw_version"], json!("7.2.5"));
    }

    #[test]
    fn test_unclosed_contexts_published() {
        let preferences = ParserPreferences {
            strict_unclosed_contexts: false,
            keep_flat_log: true,
        };
        let output = FortigateOfflineSource::with_preferences(preferences)
            .process(&bag(json!({"file": "config system admin\nedit \"admin\"\nset a b"})))
            .unwrap();
        assert_eq!(
            output[CONFIGURATION_TAG]["unclosed_contexts"],
            json!(["config system admin", "edit \"admin\""])
        );
    }

    #[test]
    fn test_missing_and_malformed_input() {
        let source = FortigateOfflineSource::new();
        assert_matches!(
            source.process(&bag(json!({}))),
            Err(PluginError::MissingInput { .. })
        );
        assert_matches!(
            source.process(&bag(json!({"file": "end\n"}))),
            Err(PluginError::PluginExecutionError { .. })
        );
    }
}
