//! Database access for fidorev-server
//!
//! SQLite via sqlx. Projects, their source rows, and committed review
//! decisions are all persisted so a restarted server recomputes the
//! review cursor from committed state.

pub mod decisions;
pub mod projects;
pub mod settings;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool against the portal database file.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create portal tables if they don't exist.
///
/// Also called by tests against `:memory:` pools.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            project_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            queue_type TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL,
            assigned_reviewer TEXT,
            columns TEXT NOT NULL DEFAULT '[]',
            row_count INTEGER NOT NULL DEFAULT 0,
            brand_edit_count INTEGER NOT NULL DEFAULT 0,
            category_edit_count INTEGER NOT NULL DEFAULT 0,
            description_edit_count INTEGER NOT NULL DEFAULT 0,
            total_review_seconds REAL NOT NULL DEFAULT 0.0,
            completed_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            started_at TEXT,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_rows (
            project_id TEXT NOT NULL,
            row_index INTEGER NOT NULL,
            fields TEXT NOT NULL,
            PRIMARY KEY (project_id, row_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_decisions (
            project_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            row_fields TEXT NOT NULL,
            action TEXT NOT NULL,
            updated_brand TEXT NOT NULL,
            updated_category TEXT NOT NULL,
            updated_description TEXT NOT NULL,
            reason TEXT NOT NULL,
            reviewer_id TEXT NOT NULL,
            review_duration_seconds REAL NOT NULL,
            committed_at TEXT NOT NULL,
            PRIMARY KEY (project_id, seq)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (projects, project_rows, review_decisions, settings)");

    Ok(())
}
