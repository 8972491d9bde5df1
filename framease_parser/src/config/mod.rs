//! Configuration module for the framease parser
//!
//! Compile-time limits live in [`compile_time`]; user preferences that may be
//! tuned per process through `FRAMEASE_*` environment variables live in
//! [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{LoggingPreferences, ParserPreferences, RuntimeConfig};
