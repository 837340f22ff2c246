//! Review session state machine
//!
//! Drives one reviewer through one claimed project, one row per cycle:
//!
//! ```text
//! Idle → AwaitingSuggestion → AwaitingDecision → Committing
//!          ↑                                        |
//!          +----------------- next row -------------+--→ Finished
//! ```
//!
//! The cursor is never stored in the session: it is always recomputed
//! from the committed-decision count, so a restarted server resumes at
//! the correct row and cannot produce duplicate decisions. The timing
//! reference resets exactly once per commit and never on abandon.

use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Row, Suggestion};
use crate::services::suggestion_client::SuggestionProvider;
use crate::services::suggestion_parser;

/// Per-row review cycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session holds a claimed project; no row in flight
    Idle,
    /// Suggestion capability invoked for the row at the cursor
    AwaitingSuggestion,
    /// Row and suggestion presented; waiting on the human
    AwaitingDecision,
    /// Decision accepted; persisting the review record
    Committing,
    /// All rows decided
    Finished,
}

/// Session transition attempted out of order
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no row is awaiting a decision")]
    NoRowPresented,

    #[error("presented row {presented} does not match committed cursor {cursor}")]
    CursorMismatch { presented: usize, cursor: usize },

    #[error("session already finished")]
    Finished,
}

/// One reviewer working one project
#[derive(Debug)]
pub struct ReviewSession {
    pub project_id: Uuid,
    pub reviewer_id: String,
    state: SessionState,
    /// Row index currently presented to the reviewer, if any
    presented_cursor: Option<usize>,
    /// Start-of-timing reference; reset only on commit
    timing_ref: Instant,
}

impl ReviewSession {
    pub fn new(project_id: Uuid, reviewer_id: String) -> Self {
        Self {
            project_id,
            reviewer_id,
            state: SessionState::Idle,
            presented_cursor: None,
            timing_ref: Instant::now(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn presented_cursor(&self) -> Option<usize> {
        self.presented_cursor
    }

    /// Enter the suggestion fetch for the row at `cursor`.
    pub fn begin_row(&mut self, cursor: usize) -> Result<(), TransitionError> {
        if self.state == SessionState::Finished {
            return Err(TransitionError::Finished);
        }
        self.state = SessionState::AwaitingSuggestion;
        self.presented_cursor = Some(cursor);
        Ok(())
    }

    /// Suggestion resolved (or defaulted); the row is now in front of the
    /// reviewer.
    pub fn row_presented(&mut self) {
        self.state = SessionState::AwaitingDecision;
    }

    /// Accept a commit for the row at `cursor`. Returns the elapsed
    /// review duration in seconds and moves to `Committing`.
    pub fn start_commit(&mut self, cursor: usize) -> Result<f64, TransitionError> {
        if self.state == SessionState::Finished {
            return Err(TransitionError::Finished);
        }
        if self.state != SessionState::AwaitingDecision {
            return Err(TransitionError::NoRowPresented);
        }
        match self.presented_cursor {
            Some(presented) if presented == cursor => {
                self.state = SessionState::Committing;
                Ok(self.timing_ref.elapsed().as_secs_f64())
            }
            Some(presented) => Err(TransitionError::CursorMismatch { presented, cursor }),
            None => Err(TransitionError::NoRowPresented),
        }
    }

    /// Decision durably appended. Resets the timing reference and either
    /// finishes or loops back for the next row.
    pub fn commit_done(&mut self, finished: bool) {
        self.timing_ref = Instant::now();
        self.presented_cursor = None;
        self.state = if finished {
            SessionState::Finished
        } else {
            SessionState::AwaitingSuggestion
        };
    }

    /// Terminal transition for a project with no remaining rows.
    pub fn finish(&mut self) {
        self.presented_cursor = None;
        self.state = SessionState::Finished;
    }
}

/// Fetch a suggestion for one row under a bounded timeout.
///
/// Failure of the AI step is never fatal: capability errors, timeouts,
/// and unusable output all yield the default suggestion with the failure
/// recorded in `reason`. Called without holding any session or project
/// lock.
pub async fn fetch_suggestion(
    provider: &dyn SuggestionProvider,
    row: &Row,
    timeout: Duration,
) -> Suggestion {
    match tokio::time::timeout(timeout, provider.suggest(row)).await {
        Ok(Ok(raw)) => suggestion_parser::parse(&raw),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Suggestion capability failed");
            Suggestion::unavailable(e.to_string())
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Suggestion request timed out");
            Suggestion::unavailable(format!("timed out after {}ms", timeout.as_millis()))
        }
    }
}

/// Edit counter rule: an update counts as an edit only when it is
/// non-empty and differs from the original field.
pub fn counts_as_edit(original: &str, updated: &str) -> bool {
    !updated.is_empty() && updated != original
}
