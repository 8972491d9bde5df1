use crate::plugins::PluginError;
use crate::resolution::PipelineError;
use crate::results::MalformedResultError;
use framease_parser::logging::{codes, Code};

/// Failure evaluating one case; isolated to that case
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Invalid parameters for case {sequence}: {reason}")]
    InvalidParameters { sequence: u32, reason: String },

    #[error("Check plugin '{plugin}' panicked: {message}")]
    Panicked { plugin: String, message: String },

    #[error("Check plugin '{plugin}' returned malformed output: {source}")]
    Malformed {
        plugin: String,
        #[source]
        source: MalformedResultError,
    },
}

impl EvaluationError {
    pub fn error_code(&self) -> Code {
        match self {
            EvaluationError::Plugin(e) => e.error_code(),
            EvaluationError::InvalidParameters { .. } => codes::plugin::INVALID_PARAMETERS,
            EvaluationError::Panicked { .. } => codes::plugin::PLUGIN_PANIC,
            EvaluationError::Malformed { source, .. } => source.error_code(),
        }
    }
}

/// Failure of a whole run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("Run '{run_id}' is already running")]
    AlreadyRunning { run_id: String },

    #[error("Run '{run_id}' has not been started")]
    NotRunning { run_id: String },

    #[error("Run '{run_id}' aborted: {source}")]
    Pipeline {
        run_id: String,
        #[source]
        source: PipelineError,
    },

    #[error("Run '{run_id}' panicked: {message}")]
    Panicked { run_id: String, message: String },
}

impl RunError {
    pub fn error_code(&self) -> Code {
        match self {
            RunError::AlreadyRunning { .. } => codes::run::RUN_ALREADY_RUNNING,
            RunError::NotRunning { .. } | RunError::Pipeline { .. } => codes::run::RUN_FAILED,
            RunError::Panicked { .. } => codes::run::RUN_PANICKED,
        }
    }
}
