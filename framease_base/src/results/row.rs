//! Row status: the per-case classification shown to reviewers
//!
//! Precedence, highest first:
//! 1. an active comment with `force_failure` forces [`RowStatus::Failure`]
//! 2. an active override comment forces [`RowStatus::Success`]
//! 3. no stored results gives [`RowStatus::NoData`]
//! 4. otherwise the automated outcome: every result passed gives `Success`,
//!    none passed gives `Failure`, a mix gives `Incomplete`

use crate::results::result::Results;
use crate::types::{Comment, TestSuite};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Success,
    Failure,
    Incomplete,
    NoData,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Success => "success",
            RowStatus::Failure => "failure",
            RowStatus::Incomplete => "incomplete",
            RowStatus::NoData => "no data",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status from stored automated results alone.
///
/// An empty result set counts as no data.
pub fn automated_status(results: Option<&Results>) -> RowStatus {
    let Some(results) = results.filter(|r| !r.is_empty()) else {
        return RowStatus::NoData;
    };
    match results.pass_count() {
        0 => RowStatus::Failure,
        n if n == results.len() => RowStatus::Success,
        _ => RowStatus::Incomplete,
    }
}

/// Status for one case sequence after applying human annotations
pub fn row_status(sequence: u32, comments: &[Comment], results: Option<&Results>) -> RowStatus {
    let active: Vec<&Comment> = comments
        .iter()
        .filter(|c| c.sequence() == sequence && c.is_active())
        .collect();

    if active.iter().any(|c| c.forces_failure()) {
        RowStatus::Failure
    } else if active.iter().any(|c| c.is_override()) {
        RowStatus::Success
    } else {
        automated_status(results)
    }
}

/// One row of a run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowReport {
    pub sequence: u32,
    pub plugin: String,
    pub status: RowStatus,
    pub result_count: usize,
}

/// Rows for every distinct case sequence of `suite`, in sequence order.
///
/// Cases sharing a sequence share a row; their plugin names are joined.
pub fn row_reports(
    suite: &TestSuite,
    results: &BTreeMap<u32, Results>,
    comments: &[Comment],
) -> Vec<RowReport> {
    let mut rows: Vec<RowReport> = Vec::new();
    for case in suite.ordered_cases() {
        if let Some(row) = rows.iter_mut().find(|row| row.sequence == case.sequence) {
            row.plugin = format!("{},{}", row.plugin, case.plugin);
            continue;
        }
        let stored = results.get(&case.sequence);
        rows.push(RowReport {
            sequence: case.sequence,
            plugin: case.plugin.clone(),
            status: row_status(case.sequence, comments, stored),
            result_count: stored.map(Results::len).unwrap_or(0),
        });
    }
    rows
}

// ============================================================================
// Run Summary
// ============================================================================

/// Aggregate of row statuses for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: usize,
    pub failure: usize,
    pub incomplete: usize,
    pub no_data: usize,
}

impl RunSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = RowStatus>) -> Self {
        let mut summary = RunSummary::default();
        for status in statuses {
            match status {
                RowStatus::Success => summary.success += 1,
                RowStatus::Failure => summary.failure += 1,
                RowStatus::Incomplete => summary.incomplete += 1,
                RowStatus::NoData => summary.no_data += 1,
            }
        }
        summary
    }

    pub fn from_rows(rows: &[RowReport]) -> Self {
        Self::from_statuses(rows.iter().map(|row| row.status))
    }

    pub fn total(&self) -> usize {
        self.success + self.failure + self.incomplete + self.no_data
    }

    /// `Success` only when every row succeeded
    pub fn overall(&self) -> RowStatus {
        if self.total() == 0 || self.no_data == self.total() {
            RowStatus::NoData
        } else if self.success == self.total() {
            RowStatus::Success
        } else if self.failure > 0 {
            RowStatus::Failure
        } else {
            RowStatus::Incomplete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::CheckResult;
    use serde_json::json;

    fn results(passes: usize, fails: usize) -> Results {
        let mut results = Results::new();
        for i in 0..passes {
            results.add(CheckResult::pass(format!("pass {}", i)));
        }
        for i in 0..fails {
            results.add(CheckResult::fail(format!("fail {}", i)));
        }
        results
    }

    #[test]
    fn test_automated_status() {
        assert_eq!(automated_status(None), RowStatus::NoData);
        assert_eq!(automated_status(Some(&Results::new())), RowStatus::NoData);
        assert_eq!(automated_status(Some(&results(3, 0))), RowStatus::Success);
        assert_eq!(automated_status(Some(&results(0, 2))), RowStatus::Failure);
        assert_eq!(automated_status(Some(&results(2, 1))), RowStatus::Incomplete);
    }

    #[test]
    fn test_force_failure_beats_everything() {
        let stored = results(2, 1);
        let comments = vec![
            Comment::override_result(1, "alice", "accepted risk"),
            Comment::force_fail(1, "bob", "not acceptable"),
        ];
        assert_eq!(row_status(1, &comments, Some(&stored)), RowStatus::Failure);
    }

    #[test]
    fn test_deleted_force_failure_is_ignored() {
        let stored = results(2, 1);
        let mut comment = Comment::force_fail(1, "bob", "not acceptable");
        comment.soft_delete();
        assert_eq!(row_status(1, &[comment], Some(&stored)), RowStatus::Incomplete);
    }

    #[test]
    fn test_override_without_results() {
        let comments = vec![Comment::override_result(2, "alice", "verified by hand")];
        assert_eq!(row_status(2, &comments, None), RowStatus::Success);
        // Comments on other sequences do not apply
        assert_eq!(row_status(3, &comments, None), RowStatus::NoData);
    }

    #[test]
    fn test_plain_notes_do_not_change_status() {
        let comments = vec![Comment::note(1, "alice", "looks fine")];
        assert_eq!(row_status(1, &comments, Some(&results(0, 1))), RowStatus::Failure);
    }

    #[test]
    fn test_row_reports_and_summary() {
        let mut suite = TestSuite::new("baseline");
        suite.add_case("fg_version", 2, json!({}));
        suite.add_case("fg_setting", 1, json!({}));
        suite.add_case("manual", 3, json!({}));

        let mut stored = BTreeMap::new();
        stored.insert(1, results(1, 0));
        stored.insert(2, results(0, 1));

        let rows = row_reports(&suite, &stored, &[]);
        let statuses: Vec<(u32, RowStatus)> = rows.iter().map(|r| (r.sequence, r.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, RowStatus::Success),
                (2, RowStatus::Failure),
                (3, RowStatus::NoData)
            ]
        );

        let summary = RunSummary::from_rows(&rows);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.overall(), RowStatus::Failure);
        assert_eq!(
            RunSummary::from_statuses([RowStatus::Success, RowStatus::Success]).overall(),
            RowStatus::Success
        );
        assert_eq!(
            RunSummary::from_statuses([RowStatus::Success, RowStatus::NoData]).overall(),
            RowStatus::Incomplete
        );
        assert_eq!(RunSummary::default().overall(), RowStatus::NoData);
    }
}
