//! Shared helpers for fidorev-server integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use fidorev_server::models::Row;
use fidorev_server::services::suggestion_client::{SuggestionError, SuggestionProvider};
use fidorev_server::AppState;

/// Provider returning the same raw text for every row
pub struct CannedSuggester(pub String);

#[async_trait]
impl SuggestionProvider for CannedSuggester {
    async fn suggest(&self, _row: &Row) -> Result<String, SuggestionError> {
        Ok(self.0.clone())
    }
}

/// Provider that never answers within any reasonable timeout
pub struct TimingOutSuggester;

#[async_trait]
impl SuggestionProvider for TimingOutSuggester {
    async fn suggest(&self, _row: &Row) -> Result<String, SuggestionError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(String::new())
    }
}

/// Provider failing immediately with a network error
pub struct FailingSuggester;

#[async_trait]
impl SuggestionProvider for FailingSuggester {
    async fn suggest(&self, _row: &Row) -> Result<String, SuggestionError> {
        Err(SuggestionError::Network("connection refused".to_string()))
    }
}

/// Create test app state with an in-memory database.
///
/// Single connection so every handler sees the same `:memory:` database.
pub async fn test_state(suggester: Arc<dyn SuggestionProvider>) -> AppState {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    fidorev_server::db::init_tables(&db).await.unwrap();

    AppState::new(db, suggester, Duration::from_millis(50))
}

/// Send a JSON request and decode the JSON response.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Send a request and return the raw body text (for CSV downloads).
pub async fn send_raw(app: &Router, method: &str, uri: &str) -> (StatusCode, String, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8_lossy(&bytes).to_string())
}

/// Upload a project and return its id.
pub async fn upload_project(app: &Router, name: &str, queue: &str, priority: &str, csv: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/projects",
        Some(serde_json::json!({
            "name": name,
            "queue_type": queue,
            "priority": priority,
            "csv": csv,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    body["project_id"].as_str().unwrap().to_string()
}

/// Claim a project for a reviewer, asserting success.
pub async fn claim_project(app: &Router, project_id: &str, reviewer_id: &str) {
    let (status, body) = send_json(
        app,
        "POST",
        &format!("/projects/{}/claim", project_id),
        Some(serde_json::json!({ "reviewer_id": reviewer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "claim failed: {}", body);
}
