//! Read-side analytics across all projects
//!
//! Recomputed on demand from committed stats; never cached, so a summary
//! can't go stale against decisions committed after it.

use serde::Serialize;
use sqlx::{Row as SqlxRow, SqlitePool};

use fidorev_common::Result;

/// Portal-wide review metrics
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsSummary {
    /// Projects uploaded, in any status
    pub project_count: usize,
    /// Rows with a committed decision, across all projects
    pub completed_rows: usize,
    /// Σ(brand + category + description edit counts)
    pub total_edits: usize,
    /// Σ(total_review_seconds) / Σ(completed_count); 0 when no rows have
    /// been reviewed anywhere
    pub average_review_seconds: f64,
}

/// Aggregate committed review stats across every project.
pub async fn summarize(pool: &SqlitePool) -> Result<AnalyticsSummary> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS project_count,
            COALESCE(SUM(completed_count), 0) AS completed_rows,
            COALESCE(SUM(brand_edit_count + category_edit_count + description_edit_count), 0)
                AS total_edits,
            COALESCE(SUM(total_review_seconds), 0.0) AS total_review_seconds
        FROM projects
        "#,
    )
    .fetch_one(pool)
    .await?;

    let project_count: i64 = row.get("project_count");
    let completed_rows: i64 = row.get("completed_rows");
    let total_edits: i64 = row.get("total_edits");
    let total_review_seconds: f64 = row.get("total_review_seconds");

    // Guard the average against an empty portal
    let average_review_seconds = if completed_rows > 0 {
        let avg = total_review_seconds / completed_rows as f64;
        (avg * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(AnalyticsSummary {
        project_count: project_count as usize,
        completed_rows: completed_rows as usize,
        total_edits: total_edits as usize,
        average_review_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn empty_portal_averages_to_zero() {
        let pool = memory_pool().await;
        let summary = summarize(&pool).await.unwrap();
        assert_eq!(summary.project_count, 0);
        assert_eq!(summary.total_edits, 0);
        assert_eq!(summary.average_review_seconds, 0.0);
    }

    #[tokio::test]
    async fn projects_without_completed_rows_average_to_zero() {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            INSERT INTO projects (project_id, name, queue_type, priority, status, created_at, row_count)
            VALUES ('p1', 'Pull 1', '"Licensed"', '"High"', '"Waiting"', '2026-01-01T00:00:00Z', 5)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let summary = summarize(&pool).await.unwrap();
        assert_eq!(summary.project_count, 1);
        assert_eq!(summary.completed_rows, 0);
        assert_eq!(summary.average_review_seconds, 0.0);
    }

    #[tokio::test]
    async fn edits_and_average_aggregate_across_projects() {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            INSERT INTO projects (project_id, name, queue_type, priority, status, created_at,
                                  row_count, brand_edit_count, category_edit_count,
                                  description_edit_count, total_review_seconds, completed_count)
            VALUES
                ('p1', 'A', '"Licensed"', '"High"', '"Done"', '2026-01-01T00:00:00Z', 2, 1, 0, 1, 10.0, 2),
                ('p2', 'B', '"Nonlicensed"', '"Low"', '"Done"', '2026-01-01T00:00:00Z', 2, 0, 2, 0, 20.0, 2)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let summary = summarize(&pool).await.unwrap();
        assert_eq!(summary.total_edits, 4);
        assert_eq!(summary.completed_rows, 4);
        assert_eq!(summary.average_review_seconds, 7.5);
    }
}
