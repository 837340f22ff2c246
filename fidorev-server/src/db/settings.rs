//! Settings key/value persistence

use sqlx::SqlitePool;
use fidorev_common::Result;

/// Read one setting, `None` when unset.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Upsert one setting.
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Suggestion API key stored via the admin settings surface.
pub async fn get_suggest_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, "suggest_api_key").await
}
