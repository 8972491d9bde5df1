//! # framease base - configuration compliance engine
//!
//! Plugin protocol and capability registry, the Result model, the
//! data-source pipeline, check evaluation and suite-run orchestration.

pub mod api;
pub mod execution;
pub mod plugins;
pub mod resolution;
pub mod results;
pub mod types;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{
        EngineConfig, EngineError, JobTicket, MemoryRunStore, RunStore, StoreError,
        ValidationEngine,
    };

    pub use crate::plugins::{
        envelope_parameters, flag, parameter, CapabilityRegistry, CheckPlugin, CommandError,
        CommandOutput, DataSourcePlugin, PluginError, RegistryBuilder, SystemCommandExecutor,
    };

    pub use crate::execution::{CheckEvaluator, RunError, RunReport, SuiteRunOrchestrator};
    pub use crate::resolution::{input_lines, DataSourcePipeline, PipelineError};
    pub use crate::results::{
        CheckOutput, CheckResult, Results, RowReport, RowStatus, RunSummary, Status,
    };

    pub use crate::types::{
        CapabilityData, Comment, DeviceCapabilitySet, ParamKind, ParamSpec, SuiteCase, TestSuite,
        ValidationRun,
    };
}
