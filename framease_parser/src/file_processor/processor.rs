//! File loading with size limits and global logging integration

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// File processor specific errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Path {path} is outside the permitted root {root}")]
    OutsideRoot { path: String, root: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } | FileProcessorError::OutsideRoot { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        crate::logging::codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub line_count: usize,
}

impl FileMetadata {
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
}

impl FileProcessingResult {
    /// Physical lines without line terminators
    pub fn lines(&self) -> Vec<String> {
        self.source.lines().map(str::to_string).collect()
    }
}

/// Loads configuration dumps and other file-typed inputs.
///
/// The size limit may be lowered per processor but never raised above the
/// compile-time maximum.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    max_file_size: u64,
    root: Option<PathBuf>,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            root: None,
        }
    }

    pub fn with_max_file_size(mut self, limit: u64) -> Self {
        self.max_file_size = limit.min(MAX_FILE_SIZE);
        self
    }

    /// Restrict reads to files under `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        log_debug!("Starting file processing", "file" => file_path);

        let path = self.resolve_path(file_path)?;
        let size = self.check_size(&path, file_path)?;
        let source = self.read_file(&path, file_path)?;

        let result = FileProcessingResult {
            metadata: FileMetadata {
                path,
                size,
                line_count: source.lines().count(),
            },
            source,
        };

        log_success!(codes::success::FILE_LOADED, "File loaded",
            "file" => file_path,
            "size_bytes" => result.metadata.size,
            "lines" => result.metadata.line_count,
            "large" => result.metadata.is_large_file());

        Ok(result)
    }

    /// Read a file as a list of physical lines
    pub fn read_lines(&self, file_path: &str) -> Result<Vec<String>, FileProcessorError> {
        self.process_file(file_path).map(|result| result.lines())
    }

    fn resolve_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        let path = Path::new(file_path);
        if !path.exists() {
            let err = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(err.error_code(), "File not found", "file" => file_path);
            return Err(err);
        }

        let Some(root) = &self.root else {
            return Ok(path.to_path_buf());
        };

        let canonical = path.canonicalize().map_err(|e| self.io_error(file_path, e))?;
        let canonical_root = root
            .canonicalize()
            .map_err(|e| self.io_error(&root.display().to_string(), e))?;
        if !canonical.starts_with(&canonical_root) {
            let err = FileProcessorError::OutsideRoot {
                path: canonical.display().to_string(),
                root: canonical_root.display().to_string(),
            };
            log_error!(err.error_code(), "Refusing to read file outside root", "file" => file_path);
            return Err(err);
        }
        Ok(canonical)
    }

    fn check_size(&self, path: &Path, file_path: &str) -> Result<u64, FileProcessorError> {
        let size = fs::metadata(path)
            .map_err(|e| self.io_error(file_path, e))?
            .len();
        if size > self.max_file_size {
            let err = FileProcessorError::FileTooLarge {
                size,
                max_size: self.max_file_size,
            };
            log_error!(err.error_code(), "File exceeds maximum size",
                "file" => file_path,
                "size" => size,
                "max_size" => self.max_file_size);
            return Err(err);
        }
        Ok(size)
    }

    fn read_file(&self, path: &Path, file_path: &str) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| self.io_error(file_path, e))
    }

    fn io_error(&self, file_path: &str, e: std::io::Error) -> FileProcessorError {
        let err = match e.kind() {
            std::io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: file_path.to_string(),
            },
            std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                path: file_path.to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("Failed to read file '{}': {}", file_path, e),
            },
        };
        log_error!(err.error_code(), &err.to_string(), "file" => file_path);
        err
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_process_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "config system global").unwrap();
        writeln!(file, "end").unwrap();

        let result = FileProcessor::new()
            .process_file(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(result.metadata.line_count, 2);
        assert_eq!(result.lines(), vec!["config system global", "end"]);
    }

    #[test]
    fn test_missing_file() {
        let err = FileProcessor::new()
            .process_file("/nonexistent/dump.conf")
            .unwrap_err();
        assert_matches!(err, FileProcessorError::FileNotFound { .. });
        assert_eq!(err.error_code(), codes::file_processing::FILE_NOT_FOUND);
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", "x".repeat(64)).unwrap();

        let err = FileProcessor::new()
            .with_max_file_size(16)
            .process_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert_matches!(err, FileProcessorError::FileTooLarge { size: 64, max_size: 16 });
    }

    #[test]
    fn test_size_limit_cannot_exceed_compile_time_max() {
        let processor = FileProcessor::new().with_max_file_size(u64::MAX);
        assert_eq!(processor.max_file_size(), MAX_FILE_SIZE);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0xfd]).unwrap();

        let err = FileProcessor::new()
            .process_file(file.path().to_str().unwrap())
            .unwrap_err();
        assert_matches!(err, FileProcessorError::InvalidEncoding { .. });
    }

    #[test]
    fn test_root_restriction() {
        let allowed = tempdir().unwrap();
        let inside = allowed.path().join("dump.conf");
        fs::write(&inside, "end\n").unwrap();
        let outside = NamedTempFile::new().unwrap();

        let processor = FileProcessor::new().with_root(allowed.path());
        assert!(processor.read_lines(inside.to_str().unwrap()).is_ok());
        let err = processor
            .read_lines(outside.path().to_str().unwrap())
            .unwrap_err();
        assert_matches!(err, FileProcessorError::OutsideRoot { .. });
    }
}
