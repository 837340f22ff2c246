//! Review session API handlers
//!
//! Drives the per-row state machine over HTTP: `next` fetches the row at
//! the committed cursor together with its AI suggestion, `commit`
//! durably appends the reviewer's decision, `quit` abandons the session
//! and returns the project to the queue.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::db::decisions::EditFlags;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    DecisionSubmission, Project, ProjectStatus, ReviewAction, Row, Suggestion,
};
use crate::services::review_session::{
    self, counts_as_edit, ReviewSession, TransitionError,
};
use crate::AppState;

/// GET /review/{project_id}/next response
#[derive(Debug, Serialize)]
pub struct NextRowResponse {
    pub project_id: Uuid,
    /// Index of the presented row; equals `total` when finished
    pub cursor: usize,
    pub total: usize,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

/// POST /review/{project_id}/commit response
#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub project_id: Uuid,
    /// Sequence index the decision landed at
    pub seq: usize,
    pub finished: bool,
    pub review_duration_seconds: f64,
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

fn require_in_progress(project: &Project) -> ApiResult<()> {
    match project.status {
        ProjectStatus::InProgress => Ok(()),
        ProjectStatus::Waiting => Err(ApiError::Conflict(
            "Project has not been claimed".to_string(),
        )),
        ProjectStatus::Done => Err(ApiError::Conflict(
            "Review is already complete".to_string(),
        )),
    }
}

/// GET /review/{project_id}/next
///
/// Advance the session to the next unreviewed row. The cursor is always
/// recomputed from committed decisions, so a restart or page reload
/// resumes at the right row. The suggestion call runs under a bounded
/// timeout and degrades to a default suggestion on any failure.
pub async fn next_row(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<NextRowResponse>> {
    let project = crate::db::projects::require_project(&state.db, project_id).await?;

    // An already-finished review reports Finished rather than erroring,
    // covering the empty-table upload reviewed by nobody.
    if project.is_done() {
        return Ok(Json(NextRowResponse {
            project_id,
            cursor: project.stats.row_count,
            total: project.stats.row_count,
            finished: true,
            row: None,
            suggestion: None,
        }));
    }
    require_in_progress(&project)?;

    let cursor = crate::db::decisions::count_decisions(&state.db, project_id).await?;
    let total = project.stats.row_count;
    let reviewer_id = project.assigned_reviewer.clone().unwrap_or_default();

    if cursor >= total {
        // Exhausted (including the empty-table case): finish and mark Done.
        let mut sessions = state.sessions.write().await;
        if let Some(session) = sessions.get_mut(&project_id) {
            session.finish();
        }
        sessions.remove(&project_id);
        drop(sessions);

        crate::db::projects::mark_done(&state.db, project_id).await?;
        tracing::info!(project_id = %project_id, rows = total, "Review complete");

        return Ok(Json(NextRowResponse {
            project_id,
            cursor: total,
            total,
            finished: true,
            row: None,
            suggestion: None,
        }));
    }

    {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .entry(project_id)
            .or_insert_with(|| ReviewSession::new(project_id, reviewer_id));
        session.begin_row(cursor)?;
    }

    let row = crate::db::projects::load_row(&state.db, project_id, cursor)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Row {} not found for project {}", cursor, project_id))
        })?;

    // Suggestion fetch happens outside the session lock; quitting the
    // review mid-fetch simply discards this result.
    let suggestion =
        review_session::fetch_suggestion(state.suggester.as_ref(), &row, state.suggest_timeout)
            .await;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&project_id).ok_or_else(|| {
        ApiError::Conflict("Review was abandoned while fetching the suggestion".to_string())
    })?;
    session.row_presented();

    Ok(Json(NextRowResponse {
        project_id,
        cursor,
        total,
        finished: false,
        row: Some(row),
        suggestion: Some(suggestion),
    }))
}

/// POST /review/{project_id}/commit
///
/// Append the reviewer's decision for the presented row, update edit
/// counters and timing, and advance. The decision lands in the same
/// transaction that transitions the project to Done when it was the last
/// row.
pub async fn commit_decision(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(submission): Json<DecisionSubmission>,
) -> ApiResult<Json<CommitResponse>> {
    let action = ReviewAction::parse_strict(&submission.action).ok_or_else(|| {
        ApiError::Validation(format!(
            "Invalid action '{}': expected Keep, Remove, or Edit",
            submission.action
        ))
    })?;

    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    require_in_progress(&project)?;

    let cursor = crate::db::decisions::count_decisions(&state.db, project_id).await?;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&project_id)
        .ok_or_else(|| ApiError::Conflict("No active review session".to_string()))?;

    let review_duration_seconds = session.start_commit(cursor)?;

    let row = crate::db::projects::load_row(&state.db, project_id, cursor)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Row {} not found for project {}", cursor, project_id))
        })?;

    let edits = EditFlags {
        brand: counts_as_edit(row.get("brand"), &submission.updated_brand),
        category: counts_as_edit(row.get("category"), &submission.updated_category),
        description: counts_as_edit(row.get("description"), &submission.updated_description),
    };

    let decision = crate::models::ReviewDecision {
        row,
        action,
        updated_brand: submission.updated_brand,
        updated_category: submission.updated_category,
        updated_description: submission.updated_description,
        reason: submission.reason,
        reviewer_id: session.reviewer_id.clone(),
        review_duration_seconds,
        committed_at: Utc::now(),
    };

    let outcome =
        crate::db::decisions::append_decision(&state.db, project_id, cursor, &decision, edits)
            .await?;

    session.commit_done(outcome.finished);
    if outcome.finished {
        sessions.remove(&project_id);
        tracing::info!(project_id = %project_id, "Review complete");
    }

    tracing::debug!(
        project_id = %project_id,
        seq = outcome.seq,
        action = action.as_str(),
        "Decision committed"
    );

    Ok(Json(CommitResponse {
        project_id,
        seq: outcome.seq,
        finished: outcome.finished,
        review_duration_seconds,
    }))
}

/// POST /review/{project_id}/quit
///
/// Abandon the session: the in-flight row is discarded uncommitted and
/// the project returns to the queue with its decisions intact. Only an
/// in-progress review can be quit.
pub async fn quit_review(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    state.sessions.write().await.remove(&project_id);

    let released = crate::db::projects::release(&state.db, project_id).await?;
    if !released {
        // Distinguish a missing project from one that isn't in progress
        let project = crate::db::projects::require_project(&state.db, project_id).await?;
        return Err(ApiError::Conflict(format!(
            "Project is not in progress (status: {:?})",
            project.status
        )));
    }

    tracing::info!(project_id = %project_id, "Review abandoned");

    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    Ok(Json(project))
}

/// Build review session routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/review/:project_id/next", get(next_row))
        .route("/review/:project_id/commit", post(commit_decision))
        .route("/review/:project_id/quit", post(quit_review))
}
