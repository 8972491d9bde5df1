//! Command execution configurations for live probes
//!
//! Provides whitelisted command executors for reaching devices directly.

pub mod ping;

pub use ping::{create_ping_command_executor, DEFAULT_PROBE_TIMEOUT};
