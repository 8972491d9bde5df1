//! Run store interface
//!
//! Persistence of runs, devices, suites and comments is owned by an external
//! collaborator. The engine only needs these opaque synchronous calls.

use crate::api::errors::StoreError;
use crate::types::{Comment, DeviceCapabilitySet, TestSuite, ValidationRun};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub trait RunStore: Send + Sync {
    fn fetch_run(&self, run_id: &str) -> Result<ValidationRun, StoreError>;

    fn fetch_device(&self, device_id: &str) -> Result<DeviceCapabilitySet, StoreError>;

    fn fetch_suite(&self, suite_id: &str) -> Result<TestSuite, StoreError>;

    /// Comments attached to the run, including soft-deleted ones
    fn fetch_comments(&self, run_id: &str) -> Result<Vec<Comment>, StoreError>;

    fn persist_run(&self, run: &ValidationRun) -> Result<(), StoreError>;

    fn enqueue_run(&self, run_id: &str) -> Result<(), StoreError>;
}

/// In-memory [`RunStore`] for tests and the CLI.
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct MemoryRunStore {
    inner: Arc<Mutex<MemoryRunStoreInner>>,
}

#[derive(Default)]
struct MemoryRunStoreInner {
    runs: BTreeMap<String, ValidationRun>,
    devices: BTreeMap<String, DeviceCapabilitySet>,
    suites: BTreeMap<String, TestSuite>,
    comments: BTreeMap<String, Vec<Comment>>,
    queue: VecDeque<String>,
    persist_count: usize,
    fail_on_persist: bool,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryRunStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_run(&self, run: ValidationRun) {
        self.lock().runs.insert(run.id.clone(), run);
    }

    pub fn insert_device(&self, device: DeviceCapabilitySet) {
        self.lock().devices.insert(device.device.clone(), device);
    }

    pub fn insert_suite(&self, suite: TestSuite) {
        self.lock().suites.insert(suite.id.clone(), suite);
    }

    pub fn add_comment(&self, run_id: &str, comment: Comment) {
        self.lock()
            .comments
            .entry(run_id.to_string())
            .or_default()
            .push(comment);
    }

    /// Next queued run id, if any
    pub fn dequeue(&self) -> Option<String> {
        self.lock().queue.pop_front()
    }

    pub fn queued(&self) -> Vec<String> {
        self.lock().queue.iter().cloned().collect()
    }

    /// Number of successful `persist_run` calls
    pub fn persist_count(&self) -> usize {
        self.lock().persist_count
    }

    /// Configure the store to fail on persist operations
    pub fn set_fail_on_persist(&self, fail: bool) {
        self.lock().fail_on_persist = fail;
    }
}

impl RunStore for MemoryRunStore {
    fn fetch_run(&self, run_id: &str) -> Result<ValidationRun, StoreError> {
        self.lock()
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::RunNotFound {
                id: run_id.to_string(),
            })
    }

    fn fetch_device(&self, device_id: &str) -> Result<DeviceCapabilitySet, StoreError> {
        self.lock()
            .devices
            .get(device_id)
            .cloned()
            .ok_or_else(|| StoreError::DeviceNotFound {
                id: device_id.to_string(),
            })
    }

    fn fetch_suite(&self, suite_id: &str) -> Result<TestSuite, StoreError> {
        self.lock()
            .suites
            .get(suite_id)
            .cloned()
            .ok_or_else(|| StoreError::SuiteNotFound {
                id: suite_id.to_string(),
            })
    }

    fn fetch_comments(&self, run_id: &str) -> Result<Vec<Comment>, StoreError> {
        Ok(self.lock().comments.get(run_id).cloned().unwrap_or_default())
    }

    fn persist_run(&self, run: &ValidationRun) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_on_persist {
            return Err(StoreError::Storage {
                reason: "persist disabled".to_string(),
            });
        }
        inner.runs.insert(run.id.clone(), run.clone());
        inner.persist_count += 1;
        Ok(())
    }

    fn enqueue_run(&self, run_id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.runs.contains_key(run_id) {
            return Err(StoreError::RunNotFound {
                id: run_id.to_string(),
            });
        }
        inner.queue.push_back(run_id.to_string());
        Ok(())
    }
}
