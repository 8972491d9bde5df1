//! # Engine API
//!
//! The surface an external scheduler and persistence layer talk to:
//! configuration, the run-store interface and the [`ValidationEngine`]
//! facade.
pub mod config;
pub mod engine;
pub mod errors;
pub mod store;

pub use config::EngineConfig;
pub use engine::{JobTicket, ValidationEngine};
pub use errors::{ConfigError, EngineError, StoreError};
pub use store::{MemoryRunStore, RunStore};
