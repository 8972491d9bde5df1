//! # Engine Configuration

use crate::api::errors::ConfigError;
use framease_parser::config::compile_time::file_processing::MAX_FILE_SIZE;
use framease_parser::FileProcessor;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the validation engine
///
/// Controls file-input resolution, live-probe timeouts, logging and plugin
/// panic isolation. Loadable from TOML; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consumer ID for logging context
    pub consumer_id: String,

    /// Directory file-typed inputs must resolve inside
    pub file_root: Option<PathBuf>,

    /// Largest configuration dump accepted, capped at the compile-time maximum
    pub max_file_size: u64,

    /// Timeout applied to whitelisted commands run by live probes
    pub command_timeout_ms: u64,

    /// Enable debug logging
    pub debug_logging: bool,

    /// Contain plugin panics as plugin failures
    pub isolate_plugin_panics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consumer_id: "framease-engine".to_string(),
            file_root: None,
            max_file_size: MAX_FILE_SIZE,
            command_timeout_ms: 5_000,
            debug_logging: false,
            isolate_plugin_panics: true,
        }
    }
}

impl EngineConfig {
    pub fn new(consumer_id: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply `FRAMEASE_*` environment overrides; unparsable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = env::var(env_vars::FILE_ROOT) {
            if !root.is_empty() {
                self.file_root = Some(PathBuf::from(root));
            }
        }
        if let Some(size) = parsed_env(env_vars::MAX_FILE_SIZE) {
            self.max_file_size = size;
        }
        if let Some(timeout) = parsed_env(env_vars::COMMAND_TIMEOUT_MS) {
            self.command_timeout_ms = timeout;
        }
        if let Some(debug) = parsed_env(env_vars::DEBUG_LOGGING) {
            self.debug_logging = debug;
        }
        if let Some(isolate) = parsed_env(env_vars::ISOLATE_PLUGIN_PANICS) {
            self.isolate_plugin_panics = isolate;
        }
        self
    }

    /// Enable debug logging
    pub fn with_debug_logging(mut self) -> Self {
        self.debug_logging = true;
        self
    }

    pub fn with_file_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.file_root = Some(root.into());
        self
    }

    pub fn with_max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_panic_isolation(mut self, isolate: bool) -> Self {
        self.isolate_plugin_panics = isolate;
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// File processor honoring the configured root and size limit
    pub fn file_processor(&self) -> FileProcessor {
        let processor = FileProcessor::new().with_max_file_size(self.max_file_size);
        match &self.file_root {
            Some(root) => processor.with_root(root),
            None => processor,
        }
    }
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Environment variable names for engine configuration
pub mod env_vars {
    pub const FILE_ROOT: &str = "FRAMEASE_FILE_ROOT";
    pub const MAX_FILE_SIZE: &str = "FRAMEASE_MAX_FILE_SIZE";
    pub const COMMAND_TIMEOUT_MS: &str = "FRAMEASE_COMMAND_TIMEOUT_MS";
    pub const DEBUG_LOGGING: &str = "FRAMEASE_DEBUG";
    pub const ISOLATE_PLUGIN_PANICS: &str = "FRAMEASE_ISOLATE_PLUGIN_PANICS";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.consumer_id, "framease-engine");
        assert!(config.file_root.is_none());
        assert_eq!(config.max_file_size, MAX_FILE_SIZE);
        assert!(config.isolate_plugin_panics);
        assert!(!config.debug_logging);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new("test-consumer")
            .with_debug_logging()
            .with_file_root("/srv/dumps")
            .with_command_timeout(Duration::from_secs(2))
            .with_panic_isolation(false);

        assert_eq!(config.consumer_id, "test-consumer");
        assert!(config.debug_logging);
        assert_eq!(config.file_root, Some(PathBuf::from("/srv/dumps")));
        assert_eq!(config.command_timeout(), Duration::from_secs(2));
        assert!(!config.isolate_plugin_panics);
    }

    #[test]
    fn test_toml_partial_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            consumer_id = "nightly"
            command_timeout_ms = 1500
            "#,
        )
        .unwrap();
        assert_eq!(config.consumer_id, "nightly");
        assert_eq!(config.command_timeout_ms, 1500);
        assert!(config.isolate_plugin_panics);
    }

    #[test]
    fn test_toml_errors() {
        let err = EngineConfig::from_toml_str("command_timeout_ms = \"soon\"").unwrap_err();
        assert_matches!(err, ConfigError::Parse { .. });

        let err = EngineConfig::from_file("/nonexistent/framease.toml").unwrap_err();
        assert_matches!(err, ConfigError::Io { .. });
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "debug_logging = true").unwrap();
        writeln!(file, "max_file_size = 1024").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(config.debug_logging);
        assert_eq!(config.file_processor().max_file_size(), 1024);
    }
}
