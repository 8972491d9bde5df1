//! # Result Model
//!
//! The status tag set, per-check results and their merge rules, normalization
//! of plugin output, and the row-status precedence applied after human
//! annotation.
//!
//! ## Core Types
//! - [`Status`] - closed tag set `NONE | PASS | FAIL | WARN`
//! - [`CheckResult`] / [`Results`] - per-check outcome and ordered collection
//! - [`CheckOutput`] - what a check plugin returns, including legacy shapes
//! - [`RowStatus`] / [`RunSummary`] - reviewer-facing classification

pub mod error;
pub mod output;
pub mod result;
pub mod row;
pub mod status;

pub use error::{value_kind, MalformedResultError};
pub use output::{normalize_legacy, CheckOutput};
pub use result::{CheckResult, Results};
pub use row::{automated_status, row_reports, row_status, RowReport, RowStatus, RunSummary};
pub use status::Status;
