//! Validation run records
//!
//! A run pairs one device with one suite. Its `data` blob keeps the latest
//! per-sequence results plus every earlier results blob in `history`.

use crate::results::Results;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Results keyed by case sequence; serialized with string keys
pub type RunResults = BTreeMap<u32, Results>;

/// Per-case evaluation failure kept alongside the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseError {
    pub sequence: u32,
    pub plugin: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunData {
    #[serde(default)]
    pub history: Vec<RunResults>,
    #[serde(default)]
    pub results: RunResults,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CaseError>,
}

impl RunData {
    /// Fresh snapshot for a new execution: the current results move into
    /// history (when non-empty) and the result set starts empty
    pub fn archived(&self) -> RunData {
        let mut history = self.history.clone();
        if !self.results.is_empty() {
            history.push(self.results.clone());
        }
        RunData {
            history,
            results: RunResults::new(),
            errors: Vec::new(),
        }
    }

    /// Snapshot with `results` merged additively into `sequence`
    pub fn with_case_results(mut self, sequence: u32, results: Results) -> RunData {
        self.results.entry(sequence).or_default().merge(results);
        self
    }

    pub fn with_case_error(mut self, error: CaseError) -> RunData {
        self.errors.push(error);
        self
    }

    pub fn results_for(&self, sequence: u32) -> Option<&Results> {
        self.results.get(&sequence)
    }
}

/// Lifecycle of a run: `Idle -> Running -> Completed | Failed`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed {
        reason: String,
    },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }
}

/// Where and when one execution happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub execution_id: String,
    pub host: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunMetadata {
    pub fn start() -> Self {
        Self {
            execution_id: uuid::Uuid::new_v4().to_string(),
            host: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

/// One device + suite pairing and its accumulated results.
///
/// The lifecycle state is owned by the orchestrator; the serialized record
/// carries it both as `state` and as the `running` flag external stores
/// expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValidationRunRecord", into = "ValidationRunRecord")]
pub struct ValidationRun {
    pub id: String,
    pub device: String,
    pub suite: String,
    pub data: RunData,
    pub submitted: bool,
    pub approved: bool,
    pub is_final: bool,
    state: RunState,
    metadata: Option<RunMetadata>,
}

impl ValidationRun {
    pub fn new(id: impl Into<String>, device: impl Into<String>, suite: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            device: device.into(),
            suite: suite.into(),
            data: RunData::default(),
            submitted: false,
            approved: false,
            is_final: false,
            state: RunState::Idle,
            metadata: None,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.metadata.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub(crate) fn set_metadata(&mut self, metadata: RunMetadata) {
        self.metadata = Some(metadata);
    }

    pub(crate) fn metadata_mut(&mut self) -> Option<&mut RunMetadata> {
        self.metadata.as_mut()
    }
}

/// Wire form of [`ValidationRun`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValidationRunRecord {
    id: String,
    device: String,
    suite: String,
    #[serde(default)]
    data: RunData,
    #[serde(default)]
    submitted: bool,
    #[serde(default)]
    approved: bool,
    #[serde(default, rename = "final")]
    is_final: bool,
    #[serde(default)]
    running: bool,
    #[serde(default)]
    state: Option<RunState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<RunMetadata>,
}

impl From<ValidationRunRecord> for ValidationRun {
    fn from(record: ValidationRunRecord) -> Self {
        // The external `running` flag wins when the two disagree
        let state = match (record.state, record.running) {
            (Some(state), running) if state.is_running() == running => state,
            (_, true) => RunState::Running,
            (_, false) => RunState::Idle,
        };
        Self {
            id: record.id,
            device: record.device,
            suite: record.suite,
            data: record.data,
            submitted: record.submitted,
            approved: record.approved,
            is_final: record.is_final,
            state,
            metadata: record.metadata,
        }
    }
}

impl From<ValidationRun> for ValidationRunRecord {
    fn from(run: ValidationRun) -> Self {
        Self {
            running: run.state.is_running(),
            id: run.id,
            device: run.device,
            suite: run.suite,
            data: run.data,
            submitted: run.submitted,
            approved: run.approved,
            is_final: run.is_final,
            state: Some(run.state),
            metadata: run.metadata,
        }
    }
}
