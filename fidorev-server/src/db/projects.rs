//! Project queue persistence
//!
//! Holds the project list, queue metadata, and the single-assignment
//! claim transition. Claims are a single conditional UPDATE so two
//! reviewers racing for the same project cannot both win.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row as SqlxRow, SqlitePool};
use uuid::Uuid;

use fidorev_common::{Error, Result};

use crate::models::{Priority, Project, ProjectStats, ProjectStatus, QueueType, Row};

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize value: {}", e)))
}

fn from_json<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", what, e)))
}

fn parse_timestamp(raw: &str, what: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", what, e)))
}

fn map_project(row: &SqliteRow) -> Result<Project> {
    let project_id: String = row.get("project_id");
    let project_id = Uuid::parse_str(&project_id)
        .map_err(|e| Error::Internal(format!("Failed to parse project_id: {}", e)))?;

    let queue_type: String = row.get("queue_type");
    let priority: String = row.get("priority");
    let status: String = row.get("status");

    let created_at: String = row.get("created_at");
    let started_at: Option<String> = row.get("started_at");
    let completed_at: Option<String> = row.get("completed_at");

    Ok(Project {
        project_id,
        name: row.get("name"),
        notes: row.get("notes"),
        queue_type: from_json::<QueueType>(&queue_type, "queue_type")?,
        priority: from_json::<Priority>(&priority, "priority")?,
        status: from_json::<ProjectStatus>(&status, "status")?,
        assigned_reviewer: row.get("assigned_reviewer"),
        stats: ProjectStats {
            row_count: row.get::<i64, _>("row_count") as usize,
            brand_edit_count: row.get::<i64, _>("brand_edit_count") as usize,
            category_edit_count: row.get::<i64, _>("category_edit_count") as usize,
            description_edit_count: row.get::<i64, _>("description_edit_count") as usize,
            total_review_seconds: row.get("total_review_seconds"),
            completed_count: row.get::<i64, _>("completed_count") as usize,
        },
        created_at: parse_timestamp(&created_at, "created_at")?,
        started_at: started_at
            .map(|s| parse_timestamp(&s, "started_at"))
            .transpose()?,
        completed_at: completed_at
            .map(|s| parse_timestamp(&s, "completed_at"))
            .transpose()?,
    })
}

/// Insert a new Waiting project together with its source rows, in one
/// transaction.
pub async fn create_project(
    pool: &SqlitePool,
    project: &Project,
    columns: &[String],
    rows: &[Row],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO projects (
            project_id, name, notes, queue_type, priority, status,
            assigned_reviewer, columns, row_count, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
        "#,
    )
    .bind(project.project_id.to_string())
    .bind(&project.name)
    .bind(&project.notes)
    .bind(to_json(&project.queue_type)?)
    .bind(to_json(&project.priority)?)
    .bind(to_json(&project.status)?)
    .bind(to_json(&columns)?)
    .bind(rows.len() as i64)
    .bind(project.created_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    for (index, source_row) in rows.iter().enumerate() {
        sqlx::query(
            "INSERT INTO project_rows (project_id, row_index, fields) VALUES (?, ?, ?)",
        )
        .bind(project.project_id.to_string())
        .bind(index as i64)
        .bind(to_json(source_row)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load one project by id.
pub async fn load_project(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query("SELECT * FROM projects WHERE project_id = ?")
        .bind(project_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_project).transpose()
}

/// Load one project, erroring when it does not exist.
pub async fn require_project(pool: &SqlitePool, project_id: Uuid) -> Result<Project> {
    load_project(pool, project_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project not found: {}", project_id)))
}

/// Original column order of the uploaded table.
pub async fn load_columns(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<String>> {
    let raw: Option<String> = sqlx::query_scalar("SELECT columns FROM projects WHERE project_id = ?")
        .bind(project_id.to_string())
        .fetch_optional(pool)
        .await?;

    match raw {
        Some(raw) => from_json(&raw, "columns"),
        None => Err(Error::NotFound(format!("Project not found: {}", project_id))),
    }
}

/// All projects in upload order (admin listing).
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query("SELECT * FROM projects ORDER BY rowid ASC")
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_project).collect()
}

/// Waiting projects of one queue, ordered by priority rank with upload
/// order breaking ties (stable).
pub async fn list_available(pool: &SqlitePool, queue_type: QueueType) -> Result<Vec<Project>> {
    let rows = sqlx::query(
        "SELECT * FROM projects WHERE status = ? AND queue_type = ? ORDER BY rowid ASC",
    )
    .bind(to_json(&ProjectStatus::Waiting)?)
    .bind(to_json(&queue_type)?)
    .fetch_all(pool)
    .await?;

    let mut projects: Vec<Project> = rows.iter().map(map_project).collect::<Result<_>>()?;
    projects.sort_by_key(|p| p.priority.rank());
    Ok(projects)
}

/// Atomically claim a Waiting project for a reviewer.
///
/// Returns false when the project is not in Waiting status (already
/// claimed, finished, or nonexistent); the conditional UPDATE is the
/// serialization point that excludes double claims.
pub async fn try_claim(pool: &SqlitePool, project_id: Uuid, reviewer_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET status = ?, assigned_reviewer = ?, started_at = ?
        WHERE project_id = ? AND status = ?
        "#,
    )
    .bind(to_json(&ProjectStatus::InProgress)?)
    .bind(reviewer_id)
    .bind(Utc::now().to_rfc3339())
    .bind(project_id.to_string())
    .bind(to_json(&ProjectStatus::Waiting)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Return an in-progress project to the queue, keeping its committed
/// decisions as the resume point.
pub async fn release(pool: &SqlitePool, project_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET status = ?, assigned_reviewer = NULL, started_at = NULL
        WHERE project_id = ? AND status = ?
        "#,
    )
    .bind(to_json(&ProjectStatus::Waiting)?)
    .bind(project_id.to_string())
    .bind(to_json(&ProjectStatus::InProgress)?)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Mark a project Done. Only valid when every row has a committed
/// decision; callers check the cursor first.
pub async fn mark_done(pool: &SqlitePool, project_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE projects
        SET status = ?, completed_at = ?
        WHERE project_id = ? AND completed_count = row_count AND status != ?
        "#,
    )
    .bind(to_json(&ProjectStatus::Done)?)
    .bind(Utc::now().to_rfc3339())
    .bind(project_id.to_string())
    .bind(to_json(&ProjectStatus::Done)?)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the source row at one index.
pub async fn load_row(pool: &SqlitePool, project_id: Uuid, index: usize) -> Result<Option<Row>> {
    let raw: Option<String> = sqlx::query_scalar(
        "SELECT fields FROM project_rows WHERE project_id = ? AND row_index = ?",
    )
    .bind(project_id.to_string())
    .bind(index as i64)
    .fetch_optional(pool)
    .await?;

    raw.map(|r| from_json(&r, "row fields")).transpose()
}
