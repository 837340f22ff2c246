//! Review decision persistence
//!
//! Decisions are append-only and keyed by (project, seq). The primary
//! key makes a replayed commit at an already-decided index a no-op
//! conflict instead of a duplicate, so the cursor derived from committed
//! state is always trustworthy.

use chrono::{DateTime, Utc};
use sqlx::{Row as SqlxRow, SqlitePool};
use uuid::Uuid;

use fidorev_common::{Error, Result};

use crate::models::{ReviewAction, ReviewDecision};

/// Which per-field edit counters a commit increments
#[derive(Debug, Clone, Copy, Default)]
pub struct EditFlags {
    pub brand: bool,
    pub category: bool,
    pub description: bool,
}

/// Result of a durable commit
#[derive(Debug, Clone, Copy)]
pub struct CommitOutcome {
    /// Sequence index the decision landed at
    pub seq: usize,
    /// True when this was the last undecided row and the project is now
    /// Done
    pub finished: bool,
}

/// Append one decision and fold its stats into the project, atomically.
///
/// When the appended decision is the final one, the project transitions
/// to Done inside the same transaction, keeping "Done iff all rows
/// decided" consistent under crashes.
pub async fn append_decision(
    pool: &SqlitePool,
    project_id: Uuid,
    seq: usize,
    decision: &ReviewDecision,
    edits: EditFlags,
) -> Result<CommitOutcome> {
    let row_fields = serde_json::to_string(&decision.row)
        .map_err(|e| Error::Internal(format!("Failed to serialize row: {}", e)))?;
    let action = serde_json::to_string(&decision.action)
        .map_err(|e| Error::Internal(format!("Failed to serialize action: {}", e)))?;

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO review_decisions (
            project_id, seq, row_fields, action,
            updated_brand, updated_category, updated_description,
            reason, reviewer_id, review_duration_seconds, committed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(project_id, seq) DO NOTHING
        "#,
    )
    .bind(project_id.to_string())
    .bind(seq as i64)
    .bind(&row_fields)
    .bind(&action)
    .bind(&decision.updated_brand)
    .bind(&decision.updated_category)
    .bind(&decision.updated_description)
    .bind(&decision.reason)
    .bind(&decision.reviewer_id)
    .bind(decision.review_duration_seconds)
    .bind(decision.committed_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Decision already recorded for row {}",
            seq
        )));
    }

    sqlx::query(
        r#"
        UPDATE projects
        SET brand_edit_count = brand_edit_count + ?,
            category_edit_count = category_edit_count + ?,
            description_edit_count = description_edit_count + ?,
            total_review_seconds = total_review_seconds + ?,
            completed_count = completed_count + 1
        WHERE project_id = ?
        "#,
    )
    .bind(edits.brand as i64)
    .bind(edits.category as i64)
    .bind(edits.description as i64)
    .bind(decision.review_duration_seconds)
    .bind(project_id.to_string())
    .execute(&mut *tx)
    .await?;

    let (completed, total): (i64, i64) = {
        let row = sqlx::query(
            "SELECT completed_count, row_count FROM projects WHERE project_id = ?",
        )
        .bind(project_id.to_string())
        .fetch_one(&mut *tx)
        .await?;
        (row.get("completed_count"), row.get("row_count"))
    };

    let finished = completed == total;
    if finished {
        sqlx::query("UPDATE projects SET status = ?, completed_at = ? WHERE project_id = ?")
            .bind(
                serde_json::to_string(&crate::models::ProjectStatus::Done)
                    .map_err(|e| Error::Internal(format!("Failed to serialize status: {}", e)))?,
            )
            .bind(Utc::now().to_rfc3339())
            .bind(project_id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(CommitOutcome { seq, finished })
}

/// Number of committed decisions: the review cursor.
pub async fn count_decisions(pool: &SqlitePool, project_id: Uuid) -> Result<usize> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM review_decisions WHERE project_id = ?")
            .bind(project_id.to_string())
            .fetch_one(pool)
            .await?;

    Ok(count as usize)
}

/// All committed decisions in commit order.
pub async fn load_decisions(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<ReviewDecision>> {
    let rows = sqlx::query(
        "SELECT * FROM review_decisions WHERE project_id = ? ORDER BY seq ASC",
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let row_fields: String = row.get("row_fields");
            let action: String = row.get("action");
            let committed_at: String = row.get("committed_at");

            Ok(ReviewDecision {
                row: serde_json::from_str(&row_fields)
                    .map_err(|e| Error::Internal(format!("Failed to deserialize row: {}", e)))?,
                action: serde_json::from_str::<ReviewAction>(&action)
                    .map_err(|e| Error::Internal(format!("Failed to deserialize action: {}", e)))?,
                updated_brand: row.get("updated_brand"),
                updated_category: row.get("updated_category"),
                updated_description: row.get("updated_description"),
                reason: row.get("reason"),
                reviewer_id: row.get("reviewer_id"),
                review_duration_seconds: row.get("review_duration_seconds"),
                committed_at: DateTime::parse_from_rfc3339(&committed_at)
                    .map_err(|e| Error::Internal(format!("Failed to parse committed_at: {}", e)))?
                    .with_timezone(&Utc),
            })
        })
        .collect()
}
