//! Capability resolution: file-input expansion and the data-source pipeline

pub mod error;
pub mod files;
pub mod pipeline;

pub use error::PipelineError;
pub use files::{
    expand_file_markers, file_data_key, file_markers, has_input, input_lines, FILE_DATA_PREFIX,
    FILE_TYPE_MARKER, FILE_TYPE_PREFIX,
};
pub use pipeline::DataSourcePipeline;
