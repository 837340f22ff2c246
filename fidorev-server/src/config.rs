//! Configuration resolution for fidorev-server
//!
//! Suggestion endpoint settings resolve with Database → ENV → TOML
//! priority. A missing API key does not prevent startup: the portal runs
//! with per-row suggestions degraded to the default instead.

use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{info, warn};

use fidorev_common::config::TomlConfig;
use fidorev_common::Result;

const ENV_API_KEY: &str = "FIDOREV_SUGGEST_API_KEY";
const DEFAULT_SUGGEST_TIMEOUT_MS: u64 = 20_000;

/// Resolved settings for the outbound suggestion call
#[derive(Debug, Clone)]
pub struct SuggestSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
}

/// Resolve the suggestion API key from 3-tier configuration.
///
/// Priority: Database → ENV → TOML.
pub async fn resolve_suggest_api_key(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_suggest_api_key(db).await?;
    let env_key = std::env::var(ENV_API_KEY).ok();
    let toml_key = toml_config.suggest_api_key.clone();

    let mut sources = Vec::new();
    if db_key.as_deref().is_some_and(is_valid_key) {
        sources.push("database");
    }
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }
    if toml_key.as_deref().is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "Suggestion API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    for (key, source) in [(db_key, "database"), (env_key, "environment"), (toml_key, "TOML")] {
        if let Some(key) = key {
            if is_valid_key(&key) {
                info!("Suggestion API key loaded from {}", source);
                return Ok(Some(key));
            }
        }
    }

    warn!(
        "Suggestion API key not configured; row suggestions will degrade to defaults. \
         Configure via the settings table, {}, or the TOML config.",
        ENV_API_KEY
    );
    Ok(None)
}

/// Resolve complete suggestion settings for startup.
pub async fn resolve_suggest_settings(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<SuggestSettings> {
    let api_key = resolve_suggest_api_key(db, toml_config).await?;
    let timeout = resolve_suggest_timeout(db).await?;

    Ok(SuggestSettings {
        api_key,
        base_url: toml_config.suggest_base_url.clone(),
        model: toml_config.suggest_model.clone(),
        timeout,
    })
}

/// Per-row suggestion timeout from the settings table (default 20s).
pub async fn resolve_suggest_timeout(db: &SqlitePool) -> Result<Duration> {
    let ms = crate::db::settings::get_setting(db, "suggest_timeout_ms")
        .await?
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SUGGEST_TIMEOUT_MS);

    Ok(Duration::from_millis(ms))
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
