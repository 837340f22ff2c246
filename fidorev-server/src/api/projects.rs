//! Project queue API handlers
//!
//! Upload, listing, claim/release, and the cleaned-CSV download.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Priority, Project, ProjectStatus, QueueType};
use crate::services::csv_codec;
use crate::AppState;

/// POST /projects request
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub name: String,
    pub queue_type: QueueType,
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    /// Raw CSV text of the data pull
    pub csv: String,
}

/// POST /projects response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub project_id: Uuid,
    pub status: ProjectStatus,
    pub row_count: usize,
}

/// POST /projects
///
/// Upload a new data pull and queue it for review.
pub async fn upload_project(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Project name must not be empty".to_string()));
    }

    let table = csv_codec::parse_table(&request.csv)?;
    if table.rows.is_empty() {
        return Err(ApiError::Validation("Uploaded table has no rows".to_string()));
    }

    let project = Project {
        project_id: Uuid::new_v4(),
        name: name.to_string(),
        notes: request.notes,
        queue_type: request.queue_type,
        priority: request.priority,
        status: ProjectStatus::Waiting,
        assigned_reviewer: None,
        stats: crate::models::ProjectStats {
            row_count: table.rows.len(),
            ..Default::default()
        },
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
    };

    crate::db::projects::create_project(&state.db, &project, &table.columns, &table.rows).await?;

    tracing::info!(
        project_id = %project.project_id,
        name = %project.name,
        rows = table.rows.len(),
        "Project uploaded and queued"
    );

    Ok(Json(UploadResponse {
        project_id: project.project_id,
        status: project.status,
        row_count: project.stats.row_count,
    }))
}

/// GET /projects
///
/// Admin listing: every project with its stats, in upload order.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = crate::db::projects::list_all(&state.db).await?;
    Ok(Json(projects))
}

/// GET /projects/available query
#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub queue: QueueType,
}

/// GET /projects/available?queue=Licensed
///
/// Waiting projects of one queue, highest priority first, upload order
/// breaking ties.
pub async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = crate::db::projects::list_available(&state.db, query.queue).await?;
    Ok(Json(projects))
}

/// GET /projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    Ok(Json(project))
}

/// POST /projects/{project_id}/claim request
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub reviewer_id: String,
}

/// POST /projects/{project_id}/claim
///
/// Atomically assign a Waiting project to a reviewer. Exactly one of two
/// concurrent claims succeeds; the loser gets 409.
pub async fn claim_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<ClaimRequest>,
) -> ApiResult<Json<Project>> {
    if request.reviewer_id.trim().is_empty() {
        return Err(ApiError::Validation("reviewer_id must not be empty".to_string()));
    }

    let claimed =
        crate::db::projects::try_claim(&state.db, project_id, &request.reviewer_id).await?;
    if !claimed {
        return Err(ApiError::Conflict(
            "Project is no longer available".to_string(),
        ));
    }

    tracing::info!(
        project_id = %project_id,
        reviewer_id = %request.reviewer_id,
        "Project claimed"
    );

    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    Ok(Json(project))
}

/// POST /projects/{project_id}/release
///
/// Reviewer abandons an in-progress review. Committed decisions stay and
/// act as the resume point; any in-flight suggestion is discarded.
pub async fn release_project(
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

    tracing::info!(project_id = %project_id, "Project released back to queue");

    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    Ok(Json(project))
}

/// GET /projects/{project_id}/export
///
/// Cleaned CSV download: original columns plus the review columns, one
/// record per committed decision in commit order. Only available once
/// the review is Done.
pub async fn export_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let project = crate::db::projects::require_project(&state.db, project_id).await?;
    if !project.is_done() {
        return Err(ApiError::Conflict(
            "Review is not complete; export is only available for Done projects".to_string(),
        ));
    }

    let columns = crate::db::projects::load_columns(&state.db, project_id).await?;
    let decisions = crate::db::decisions::load_decisions(&state.db, project_id).await?;
    let csv = csv_codec::export_decisions(&columns, &decisions)?;

    let disposition = format!("attachment; filename=\"{}_cleaned.csv\"", project.name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// Build project queue routes
pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(upload_project).get(list_projects))
        .route("/projects/available", get(list_available))
        .route("/projects/:project_id", get(get_project))
        .route("/projects/:project_id/claim", post(claim_project))
        .route("/projects/:project_id/release", post(release_project))
        .route("/projects/:project_id/export", get(export_project))
}
