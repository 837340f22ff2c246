//! fidorev-server library interface
//!
//! Exposes the portal's state, router, and services for integration
//! testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::services::review_session::ReviewSession;
use crate::services::suggestion_client::SuggestionProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Suggestion capability (trait object so tests can inject one)
    pub suggester: Arc<dyn SuggestionProvider>,
    /// Bound on each per-row suggestion call
    pub suggest_timeout: Duration,
    /// Active review sessions, keyed by project id
    pub sessions: Arc<RwLock<HashMap<Uuid, ReviewSession>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        suggester: Arc<dyn SuggestionProvider>,
        suggest_timeout: Duration,
    ) -> Self {
        Self {
            db,
            suggester,
            suggest_timeout,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::project_routes())
        .merge(api::review_routes())
        .merge(api::analytics_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
