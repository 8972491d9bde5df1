//! Configuration hierarchy parser for framease
//!
//! Parses FortiOS-style `config`/`edit`/`set`/`next`/`end` dumps into a
//! [`ConfigHierarchy`], and hosts the coded logging subsystem shared by the
//! rest of the workspace.

pub mod config;
pub mod file_processor;
pub mod hierarchy;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod syntax;
pub mod tokens;

pub use file_processor::{FileProcessor, FileProcessorError};
pub use hierarchy::{ConfigHierarchy, ConfigNode, ConfigValue};
pub use syntax::{parse, HierarchyParser, ParseError, ParseStatistics};

/// Errors from loading and parsing a dump in one step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    File(#[from] FileProcessorError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            LoadError::File(err) => err.error_code(),
            LoadError::Parse(err) => err.error_code(),
        }
    }
}

/// Load a dump from disk and parse it with default preferences
pub fn parse_file(file_path: &str) -> Result<ConfigHierarchy, LoadError> {
    let result = file_processor::process_file(file_path)?;
    Ok(HierarchyParser::new().parse(&result.source)?)
}
