//! Check evaluation and suite-run orchestration

pub mod error;
pub mod evaluator;
pub mod orchestrator;

pub use error::{EvaluationError, RunError};
pub use evaluator::{case_parameters, CaseOutcome, CheckEvaluator, PARAMETERS_KEY};
pub use orchestrator::{RunReport, SuiteRunOrchestrator};
