//! # Validation Engine
//!
//! Facade the external scheduler drives: [`ValidationEngine::dispatch`]
//! queues a run and [`ValidationEngine::execute`] is the background unit of
//! work for one queued run.
use crate::api::config::EngineConfig;
use crate::api::errors::EngineError;
use crate::api::store::RunStore;
use crate::execution::{RunError, RunReport, SuiteRunOrchestrator};
use crate::plugins::{panic_message, CapabilityRegistry};
use chrono::{DateTime, Utc};
use framease_parser::logging::codes;
use framease_parser::{log_debug, log_error, log_success};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Receipt for a queued run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTicket {
    pub job_id: String,
    pub run_id: String,
    pub enqueued_at: DateTime<Utc>,
}

pub struct ValidationEngine {
    registry: Arc<CapabilityRegistry>,
    store: Arc<dyn RunStore>,
    config: EngineConfig,
    orchestrator: SuiteRunOrchestrator,
}

impl ValidationEngine {
    pub fn new<S: RunStore + 'static>(registry: CapabilityRegistry, store: S) -> Self {
        Self::with_config(EngineConfig::default(), registry, store)
    }

    pub fn with_config<S: RunStore + 'static>(
        config: EngineConfig,
        registry: CapabilityRegistry,
        store: S,
    ) -> Self {
        let registry = Arc::new(registry);
        let orchestrator = SuiteRunOrchestrator::new(Arc::clone(&registry))
            .with_file_processor(config.file_processor())
            .with_panic_isolation(config.isolate_plugin_panics);
        log_debug!("Validation engine configured",
            "consumer" => &config.consumer_id,
            "isolate_plugin_panics" => config.isolate_plugin_panics,
            "max_file_size" => config.max_file_size);
        Self {
            registry,
            store: Arc::new(store),
            config,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn RunStore {
        self.store.as_ref()
    }

    /// Queue a run for background execution
    pub fn dispatch(&self, run_id: &str) -> Result<JobTicket, EngineError> {
        let run = self.store.fetch_run(run_id)?;
        if run.is_running() {
            let err = RunError::AlreadyRunning {
                run_id: run.id.clone(),
            };
            log_error!(err.error_code(), "Refusing to dispatch run", "run" => run_id);
            return Err(err.into());
        }

        self.store.enqueue_run(run_id)?;
        let ticket = JobTicket {
            job_id: uuid::Uuid::new_v4().to_string(),
            run_id: run_id.to_string(),
            enqueued_at: Utc::now(),
        };
        log_success!(codes::success::RUN_DISPATCHED, "Run dispatched",
            "run" => run_id,
            "job" => &ticket.job_id,
            "consumer" => &self.config.consumer_id);
        Ok(ticket)
    }

    /// Execute one queued run.
    ///
    /// The run is marked running and persisted before any work starts; its
    /// terminal state is persisted on every exit path after that.
    pub fn execute(&self, run_id: &str) -> Result<RunReport, EngineError> {
        let mut run = self.store.fetch_run(run_id)?;
        let device = self.store.fetch_device(&run.device)?;
        let suite = self.store.fetch_suite(&run.suite)?;
        let comments = self.store.fetch_comments(run_id)?;

        self.orchestrator.begin(&mut run)?;
        self.store.persist_run(&run)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.orchestrator
                .execute(&mut run, &device, &suite, &comments)
        }))
        .unwrap_or_else(|payload| {
            let err = RunError::Panicked {
                run_id: run_id.to_string(),
                message: panic_message(payload.as_ref()),
            };
            log_error!(err.error_code(), "Run panicked", "run" => run_id, "error" => &err);
            Err(err)
        });

        if let Err(e) = self.store.persist_run(&run) {
            log_error!(e.error_code(), "Failed to persist run state",
                "run" => run_id,
                "state" => format!("{:?}", run.state()),
                "error" => &e);
            return Err(e.into());
        }
        Ok(outcome?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::StoreError;
    use crate::api::store::MemoryRunStore;
    use crate::plugins::testing::{CheckBehavior, StaticCheck, StaticSource};
    use crate::plugins::RegistryBuilder;
    use crate::results::RowStatus;
    use crate::types::{CapabilityData, Comment, DeviceCapabilitySet, RunState, TestSuite, ValidationRun};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn registry() -> CapabilityRegistry {
        RegistryBuilder::new()
            .add_data_source(StaticSource::new("offline", &["fgt_cli_configuration"], &[]))
            .unwrap()
            .add_data_source(StaticSource::new("broken", &[], &[]).failing())
            .unwrap()
            .add_check(StaticCheck::passing("pass_check", &["fgt_cli_configuration"]))
            .unwrap()
            .add_check(StaticCheck::new("panicking", &[], CheckBehavior::Panic))
            .unwrap()
            .build()
    }

    fn seeded_store(source: &str) -> MemoryRunStore {
        let store = MemoryRunStore::new();
        let mut device = DeviceCapabilitySet::new("fw1");
        device.add_data_source(source, CapabilityData::new());
        store.insert_device(device);

        let mut suite = TestSuite::new("baseline");
        suite
            .add_case("pass_check", 1, json!({}))
            .add_case("panicking", 2, json!({}));
        store.insert_suite(suite);
        store.insert_run(ValidationRun::new("r1", "fw1", "baseline"));
        store
    }

    #[test]
    fn test_dispatch_then_execute() {
        let store = seeded_store("offline");
        store.add_comment("r1", Comment::override_result(2, "reviewer", "checked by hand"));
        let engine = ValidationEngine::new(registry(), store.clone());

        let ticket = engine.dispatch("r1").unwrap();
        assert_eq!(ticket.run_id, "r1");
        assert_eq!(store.dequeue().as_deref(), Some("r1"));

        let report = engine.execute("r1").unwrap();
        assert_eq!(report.rows[0].status, RowStatus::Success);
        assert_eq!(report.rows[1].status, RowStatus::Success);
        assert_eq!(report.errors.len(), 1);

        let stored = store.fetch_run("r1").unwrap();
        assert_eq!(stored.state(), &RunState::Completed);
        assert!(!stored.is_running());
        assert_eq!(store.persist_count(), 2);
    }

    #[test]
    fn test_failed_run_persisted_not_running() {
        let store = seeded_store("broken");
        let engine = ValidationEngine::new(registry(), store.clone());

        let err = engine.execute("r1").unwrap_err();
        assert_matches!(err, EngineError::Run(RunError::Pipeline { .. }));
        let stored = store.fetch_run("r1").unwrap();
        assert!(!stored.is_running());
        assert_matches!(stored.state(), RunState::Failed { .. });
    }

    #[test]
    fn test_panic_outside_isolation_persisted_as_failed() {
        let store = seeded_store("offline");
        let config = EngineConfig::default().with_panic_isolation(false);
        let engine = ValidationEngine::with_config(config, registry(), store.clone());

        let err = engine.execute("r1").unwrap_err();
        assert_matches!(err, EngineError::Run(RunError::Panicked { .. }));
        assert_eq!(err.error_code(), codes::run::RUN_PANICKED);
        let stored = store.fetch_run("r1").unwrap();
        assert_matches!(stored.state(), RunState::Failed { .. });
    }

    #[test]
    fn test_dispatch_refuses_running_run() {
        let store = seeded_store("offline");
        let mut run = ValidationRun::new("r2", "fw1", "baseline");
        SuiteRunOrchestrator::new(Arc::new(registry()))
            .begin(&mut run)
            .unwrap();
        store.insert_run(run);
        let engine = ValidationEngine::new(registry(), store.clone());

        assert_matches!(
            engine.dispatch("r2"),
            Err(EngineError::Run(RunError::AlreadyRunning { .. }))
        );
        assert!(store.queued().is_empty());
    }

    #[test]
    fn test_missing_records() {
        let store = seeded_store("offline");
        store.insert_run(ValidationRun::new("r3", "fw9", "baseline"));
        let engine = ValidationEngine::new(registry(), store.clone());

        assert_matches!(
            engine.execute("nope"),
            Err(EngineError::Store(StoreError::RunNotFound { .. }))
        );
        assert_matches!(
            engine.execute("r3"),
            Err(EngineError::Store(StoreError::DeviceNotFound { .. }))
        );
        assert!(!store.fetch_run("r3").unwrap().is_running());
    }
}
