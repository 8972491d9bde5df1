use crate::plugins::PluginError;
use framease_parser::logging::{codes, Code};

/// Failures that abort capability resolution for a device
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Data source '{plugin}' (sequence {sequence}) failed: {source}")]
    DataSource {
        plugin: String,
        sequence: u32,
        #[source]
        source: PluginError,
    },

    #[error("Data source '{plugin}' (sequence {sequence}) panicked: {message}")]
    Panicked {
        plugin: String,
        sequence: u32,
        message: String,
    },
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::DataSource { source, .. } => source.error_code(),
            PipelineError::Panicked { .. } => codes::plugin::PLUGIN_PANIC,
        }
    }

    pub fn plugin(&self) -> &str {
        match self {
            PipelineError::DataSource { plugin, .. } | PipelineError::Panicked { plugin, .. } => {
                plugin
            }
        }
    }
}
