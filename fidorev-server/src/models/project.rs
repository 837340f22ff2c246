//! Project queue entries and their lifecycle
//!
//! A project progresses WAITING → IN PROGRESS → DONE. At most one reviewer
//! holds a project at a time; the claim transition is atomic in the
//! database layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Queue partition used for reviewer self-selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueType {
    Licensed,
    Nonlicensed,
}

/// Upload priority; lower rank is served first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: High < Medium < Low
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Project lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Uploaded, waiting for a reviewer to claim it
    Waiting,
    /// Claimed by exactly one reviewer
    InProgress,
    /// Every row has a committed decision
    Done,
}

/// Per-project review statistics, maintained incrementally on each commit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Total rows in the uploaded table
    pub row_count: usize,
    /// Commits where the updated brand was non-empty and differed
    pub brand_edit_count: usize,
    /// Commits where the updated category was non-empty and differed
    pub category_edit_count: usize,
    /// Commits where the updated description was non-empty and differed
    pub description_edit_count: usize,
    /// Wall-clock seconds accumulated across committed decisions
    pub total_review_seconds: f64,
    /// Committed decisions so far (the cursor)
    pub completed_count: usize,
}

/// One uploaded data pull and its queue metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Uuid,
    pub name: String,
    /// Free-text notes from the admin upload form
    pub notes: String,
    pub queue_type: QueueType,
    pub priority: Priority,
    pub status: ProjectStatus,
    /// Set iff status is InProgress or Done
    pub assigned_reviewer: Option<String>,
    pub stats: ProjectStats,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn is_done(&self) -> bool {
        self.status == ProjectStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn status_serializes_as_bare_name() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
    }
}
