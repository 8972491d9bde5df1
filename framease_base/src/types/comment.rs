//! Human annotations attached to one case sequence of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviewer comment, optionally overriding or force-failing a row.
///
/// Comments are immutable after creation apart from soft deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    body: String,
    author: String,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
    sequence: u32,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    is_override: bool,
    #[serde(default)]
    force_failure: bool,
}

impl Comment {
    fn create(sequence: u32, author: &str, body: &str, is_override: bool, force_failure: bool) -> Self {
        Self {
            body: body.to_string(),
            author: author.to_string(),
            timestamp: Utc::now(),
            sequence,
            deleted: false,
            is_override,
            force_failure,
        }
    }

    /// Plain note with no effect on row status
    pub fn note(sequence: u32, author: &str, body: &str) -> Self {
        Self::create(sequence, author, body, false, false)
    }

    /// Marks the row as passing regardless of automated results
    pub fn override_result(sequence: u32, author: &str, body: &str) -> Self {
        Self::create(sequence, author, body, true, false)
    }

    /// Marks the row as failing; takes precedence over overrides
    pub fn force_fail(sequence: u32, author: &str, body: &str) -> Self {
        Self::create(sequence, author, body, false, true)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    pub fn is_override(&self) -> bool {
        self.is_override
    }

    pub fn forces_failure(&self) -> bool {
        self.force_failure
    }

    /// Returns whether the comment was active before the call
    pub fn soft_delete(&mut self) -> bool {
        let was_active = !self.deleted;
        self.deleted = true;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut comment = Comment::force_fail(4, "bob", "weak ciphers");
        assert!(comment.is_active());
        assert!(comment.soft_delete());
        assert!(!comment.soft_delete());
        assert!(comment.is_deleted());
        // Flags survive deletion for the audit trail
        assert!(comment.forces_failure());
        assert_eq!(comment.body(), "weak ciphers");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let comment: Comment = serde_json::from_value(json!({
            "body": "accepted",
            "author": "alice",
            "sequence": 2,
            "is_override": true
        }))
        .unwrap();
        assert!(comment.is_override());
        assert!(!comment.forces_failure());
        assert!(comment.is_active());
        assert_eq!(comment.sequence(), 2);
        assert_eq!(comment.author(), "alice");
    }
}
