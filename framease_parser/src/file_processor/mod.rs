//! File processor module with compile-time limits and global logging integration

mod processor;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with default settings
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Get the compile-time maximum file size limit
pub fn get_max_file_size() -> u64 {
    crate::config::compile_time::file_processing::MAX_FILE_SIZE
}
