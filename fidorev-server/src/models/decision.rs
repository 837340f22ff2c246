//! Review decisions
//!
//! One decision is created per row, append-only, in review order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Row;

/// Reviewer verdict for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    Keep,
    Remove,
    Edit,
}

impl ReviewAction {
    /// Strict case-insensitive parse; `None` for anything outside the
    /// three verdicts. Used for validating reviewer submissions.
    pub fn parse_strict(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Some(ReviewAction::Keep),
            "remove" => Some(ReviewAction::Remove),
            "edit" => Some(ReviewAction::Edit),
            _ => None,
        }
    }

    /// Loose normalization for model output: `no change` means keep, and
    /// any unrecognized value degrades to `Keep`.
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" => ReviewAction::Remove,
            "edit" => ReviewAction::Edit,
            _ => ReviewAction::Keep,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Keep => "Keep",
            ReviewAction::Remove => "Remove",
            ReviewAction::Edit => "Edit",
        }
    }
}

/// Field values the reviewer submits for one row
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionSubmission {
    pub action: String,
    #[serde(default)]
    pub updated_brand: String,
    #[serde(default)]
    pub updated_category: String,
    #[serde(default)]
    pub updated_description: String,
    #[serde(default)]
    pub reason: String,
}

/// A committed review decision: the original row plus the reviewer's
/// verdict and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecision {
    /// The source row exactly as uploaded
    pub row: Row,
    pub action: ReviewAction,
    pub updated_brand: String,
    pub updated_category: String,
    pub updated_description: String,
    pub reason: String,
    pub reviewer_id: String,
    /// Wall-clock seconds between row presentation and commit
    pub review_duration_seconds: f64,
    pub committed_at: DateTime<Utc>,
}
