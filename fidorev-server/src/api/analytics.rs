//! Analytics API handler

use axum::{extract::State, routing::get, Json, Router};

use crate::error::ApiResult;
use crate::services::analytics::{self, AnalyticsSummary};
use crate::AppState;

/// GET /analytics
///
/// Portal-wide review metrics, recomputed on demand.
pub async fn get_analytics(State(state): State<AppState>) -> ApiResult<Json<AnalyticsSummary>> {
    let summary = analytics::summarize(&state.db).await?;
    Ok(Json(summary))
}

/// Build analytics routes
pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics", get(get_analytics))
}
