//! Suite-run orchestration
//!
//! A run moves `Idle -> Running -> Completed | Failed`. [`SuiteRunOrchestrator::begin`]
//! claims the run (refusing one that is already running) and
//! [`SuiteRunOrchestrator::execute`] resolves capability data, evaluates every
//! case and commits the new result snapshot. Prior results are archived into
//! history only when the new snapshot is committed; a run that aborts keeps
//! its previous data untouched.

use crate::execution::error::RunError;
use crate::execution::evaluator::CheckEvaluator;
use crate::plugins::CapabilityRegistry;
use crate::resolution::DataSourcePipeline;
use crate::results::{row_reports, RowReport, RunSummary};
use crate::types::{
    CaseError, Comment, DeviceCapabilitySet, RunMetadata, RunState, TestSuite, ValidationRun,
};
use framease_parser::logging::codes;
use framease_parser::FileProcessor;
use framease_parser::{log_error, log_info, log_success, log_warning};
use serde::Serialize;
use std::sync::Arc;

/// Reviewer-facing outcome of one execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    pub state: RunState,
    pub rows: Vec<RowReport>,
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CaseError>,
}

impl RunReport {
    /// Report for the run's current result snapshot
    pub fn from_run(run: &ValidationRun, suite: &TestSuite, comments: &[Comment]) -> Self {
        let rows = row_reports(suite, &run.data.results, comments);
        let summary = RunSummary::from_rows(&rows);
        Self {
            run_id: run.id.clone(),
            execution_id: run.metadata().map(|m| m.execution_id.clone()),
            state: run.state().clone(),
            rows,
            summary,
            errors: run.data.errors.clone(),
        }
    }
}

pub struct SuiteRunOrchestrator {
    pipeline: DataSourcePipeline,
    evaluator: CheckEvaluator,
}

impl SuiteRunOrchestrator {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            pipeline: DataSourcePipeline::new(Arc::clone(&registry)),
            evaluator: CheckEvaluator::new(registry),
        }
    }

    pub fn with_file_processor(self, files: FileProcessor) -> Self {
        Self {
            pipeline: self.pipeline.with_file_processor(files.clone()),
            evaluator: self.evaluator.with_file_processor(files),
        }
    }

    pub fn with_panic_isolation(self, isolate: bool) -> Self {
        Self {
            pipeline: self.pipeline.with_panic_isolation(isolate),
            evaluator: self.evaluator.with_panic_isolation(isolate),
        }
    }

    pub fn evaluator(&self) -> &CheckEvaluator {
        &self.evaluator
    }

    /// Claim the run for execution
    pub fn begin(&self, run: &mut ValidationRun) -> Result<(), RunError> {
        if run.is_running() {
            let err = RunError::AlreadyRunning {
                run_id: run.id.clone(),
            };
            log_error!(err.error_code(), "Refusing to start run", "run" => &run.id);
            return Err(err);
        }

        run.set_state(RunState::Running);
        run.set_metadata(RunMetadata::start());
        if let Some(metadata) = run.metadata() {
            log_info!("Run started",
                "run" => &run.id,
                "execution_id" => &metadata.execution_id,
                "host" => &metadata.host);
        }
        Ok(())
    }

    /// Execute a run previously claimed with [`begin`](Self::begin)
    pub fn execute(
        &self,
        run: &mut ValidationRun,
        device: &DeviceCapabilitySet,
        suite: &TestSuite,
        comments: &[Comment],
    ) -> Result<RunReport, RunError> {
        if !run.is_running() {
            let err = RunError::NotRunning {
                run_id: run.id.clone(),
            };
            log_error!(err.error_code(), "Run must be started before execution", "run" => &run.id);
            return Err(err);
        }

        let mut guard = RunGuard::new(run);
        let outcome = self.execute_claimed(guard.run(), device, suite, comments);
        guard.disarm();
        outcome
    }

    /// [`begin`](Self::begin) followed by [`execute`](Self::execute)
    pub fn run(
        &self,
        run: &mut ValidationRun,
        device: &DeviceCapabilitySet,
        suite: &TestSuite,
        comments: &[Comment],
    ) -> Result<RunReport, RunError> {
        self.begin(run)?;
        self.execute(run, device, suite, comments)
    }

    fn execute_claimed(
        &self,
        run: &mut ValidationRun,
        device: &DeviceCapabilitySet,
        suite: &TestSuite,
        comments: &[Comment],
    ) -> Result<RunReport, RunError> {
        log_info!("Executing suite",
            "run" => &run.id,
            "device" => &device.device,
            "suite" => &suite.id,
            "cases" => suite.cases().len());

        let bag = match self.pipeline.resolve(device) {
            Ok(bag) => bag,
            Err(source) => {
                let err = RunError::Pipeline {
                    run_id: run.id.clone(),
                    source,
                };
                log_error!(err.error_code(), "Run failed during capability resolution",
                    "run" => &run.id,
                    "error" => &err);
                finish(run, RunState::Failed {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let mut data = run.data.archived();
        for case in suite.ordered_cases() {
            let outcome = self.evaluator.evaluate(case, &bag);
            if let Some(error) = outcome.error {
                log_warning!(code = codes::run::CASE_FAILED, "Case produced no results",
                    "run" => &run.id,
                    "sequence" => case.sequence);
                data = data.with_case_error(CaseError {
                    sequence: case.sequence,
                    plugin: case.plugin.clone(),
                    code: error.error_code().to_string(),
                    message: error.to_string(),
                });
            }
            data = data.with_case_results(case.sequence, outcome.results);
        }
        run.data = data;
        finish(run, RunState::Completed);

        let report = RunReport::from_run(run, suite, comments);
        log_success!(codes::success::RUN_COMPLETED, "Run completed",
            "run" => &run.id,
            "overall" => report.summary.overall(),
            "success" => report.summary.success,
            "failure" => report.summary.failure,
            "incomplete" => report.summary.incomplete,
            "no_data" => report.summary.no_data,
            "case_errors" => report.errors.len());
        Ok(report)
    }
}

fn finish(run: &mut ValidationRun, state: RunState) {
    run.set_state(state);
    if let Some(metadata) = run.metadata_mut() {
        metadata.finish();
    }
}

/// Marks the run failed if execution unwinds before it is disarmed, so a
/// crashed execution never leaves the run stuck in `Running`
struct RunGuard<'a> {
    run: &'a mut ValidationRun,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(run: &'a mut ValidationRun) -> Self {
        Self { run, armed: true }
    }

    fn run(&mut self) -> &mut ValidationRun {
        &mut *self.run
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        log_error!(codes::run::RUN_PANICKED, "Run aborted before completion", "run" => &self.run.id);
        finish(&mut *self.run, RunState::Failed {
            reason: "run aborted before completion".to_string(),
        });
    }
}
