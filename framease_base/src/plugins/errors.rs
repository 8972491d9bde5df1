//! Error types for the plugin module
//!
//! Registration, lookup and execution failures for data-source and check
//! plugins.

use framease_parser::logging::{codes, Code};

/// Plugin registration, lookup and execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin not found: {name}")]
    PluginNotFound { name: String },

    #[error("Duplicate plugin registration: {name}")]
    DuplicatePlugin { name: String },

    #[error("Plugin '{plugin}' declares invalid capability tag '{tag}'")]
    InvalidCapabilityTag { plugin: String, tag: String },

    #[error("Plugin '{plugin}' failed: {reason}")]
    PluginExecutionError { plugin: String, reason: String },

    #[error("Plugin '{plugin}' requires input '{input}' which is not available")]
    MissingInput { plugin: String, input: String },

    #[error("Failed to expand file input '{name}' from '{path}': {reason}")]
    FileExpansion {
        name: String,
        path: String,
        reason: String,
    },
}

impl PluginError {
    /// Shorthand used by plugin implementations
    pub fn execution(plugin: &str, reason: impl Into<String>) -> Self {
        PluginError::PluginExecutionError {
            plugin: plugin.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing_input(plugin: &str, input: &str) -> Self {
        PluginError::MissingInput {
            plugin: plugin.to_string(),
            input: input.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PluginError::PluginNotFound { .. } => codes::plugin::PLUGIN_NOT_FOUND,
            PluginError::DuplicatePlugin { .. } => codes::plugin::DUPLICATE_PLUGIN,
            PluginError::InvalidCapabilityTag { .. } => codes::plugin::INVALID_CAPABILITY_TAG,
            PluginError::PluginExecutionError { .. } => codes::plugin::PLUGIN_EXECUTION_ERROR,
            PluginError::MissingInput { .. } => codes::pipeline::MISSING_INPUT,
            PluginError::FileExpansion { .. } => codes::pipeline::FILE_EXPANSION_FAILED,
        }
    }

    /// Lookup failures point at stored configuration, not at the plugin
    pub fn is_data_integrity_error(&self) -> bool {
        matches!(self, PluginError::PluginNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PluginError::PluginNotFound {
            name: "missing".to_string(),
        };
        assert_eq!(err.error_code(), codes::plugin::PLUGIN_NOT_FOUND);
        assert!(err.is_data_integrity_error());

        let err = PluginError::missing_input("ping", "ip_address");
        assert_eq!(err.error_code(), codes::pipeline::MISSING_INPUT);
        assert_eq!(
            err.to_string(),
            "Plugin 'ping' requires input 'ip_address' which is not available"
        );
    }
}
