//! Domain records shared by the pipeline, evaluator and orchestrator

pub mod comment;
pub mod device;
pub mod params;
pub mod run;
pub mod suite;

pub use comment::Comment;
pub use device::{DataSourceInstance, DeviceCapabilitySet};
pub use params::{ParamKind, ParamSpec};
pub use run::{CaseError, RunData, RunMetadata, RunResults, RunState, ValidationRun};
pub use suite::{SuiteCase, TestSuite};

/// Flat string-keyed bag exchanged with plugins
pub type CapabilityData = serde_json::Map<String, serde_json::Value>;
