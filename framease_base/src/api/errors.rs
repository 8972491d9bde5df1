//! # Engine Errors

use framease_parser::logging::{codes, Code};

/// Engine configuration could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    Parse { reason: String },
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        codes::store::INVALID_CONFIGURATION
    }
}

/// Run store lookups and writes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Run not found: {id}")]
    RunNotFound { id: String },

    #[error("Device not found: {id}")]
    DeviceNotFound { id: String },

    #[error("Suite not found: {id}")]
    SuiteNotFound { id: String },

    #[error("Storage failure: {reason}")]
    Storage { reason: String },
}

impl StoreError {
    pub fn error_code(&self) -> Code {
        match self {
            StoreError::RunNotFound { .. } => codes::store::RUN_NOT_FOUND,
            StoreError::DeviceNotFound { .. } => codes::store::DEVICE_NOT_FOUND,
            StoreError::SuiteNotFound { .. } => codes::store::SUITE_NOT_FOUND,
            StoreError::Storage { .. } => codes::store::STORAGE_FAILURE,
        }
    }

    /// Missing records are reported to the caller; storage failures are not
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StoreError::Storage { .. })
    }
}

/// Failure of a dispatched engine job
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Run(#[from] crate::execution::RunError),
}

impl EngineError {
    pub fn error_code(&self) -> Code {
        match self {
            EngineError::Store(e) => e.error_code(),
            EngineError::Run(e) => e.error_code(),
        }
    }
}
