//! Project queue API integration tests
//!
//! Upload validation, priority-ordered listings, claim/release
//! lifecycle, and the export gate.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use fidorev_server::build_router;
use helpers::*;

const TWO_ROW_CSV: &str = "brand,UPC,description,category\nAcme,0123,Acme snack,Snacks\nZyx,0456,Zyx drink,Drinks\n";

async fn test_app() -> axum::Router {
    let state = test_state(Arc::new(FailingSuggester)).await;
    build_router(state)
}

#[tokio::test]
async fn upload_with_empty_name_is_rejected() {
    let app = test_app().await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/projects",
        Some(json!({
            "name": "   ",
            "queue_type": "Licensed",
            "priority": "High",
            "csv": TWO_ROW_CSV,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn upload_with_no_rows_is_rejected() {
    let app = test_app().await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/projects",
        Some(json!({
            "name": "Empty pull",
            "queue_type": "Licensed",
            "priority": "High",
            "csv": "brand,UPC\n",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn upload_creates_waiting_project() {
    let app = test_app().await;
    let id = upload_project(&app, "March pull", "Licensed", "High", TWO_ROW_CSV).await;

    let (status, body) = send_json(&app, "GET", &format!("/projects/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Waiting");
    assert_eq!(body["assigned_reviewer"], serde_json::Value::Null);
    assert_eq!(body["stats"]["row_count"], 2);
    assert_eq!(body["stats"]["completed_count"], 0);
}

#[tokio::test]
async fn available_listing_orders_by_priority_with_stable_ties() {
    let app = test_app().await;
    let low = upload_project(&app, "Low pull", "Licensed", "Low", TWO_ROW_CSV).await;
    let high_a = upload_project(&app, "High pull A", "Licensed", "High", TWO_ROW_CSV).await;
    let medium = upload_project(&app, "Medium pull", "Licensed", "Medium", TWO_ROW_CSV).await;
    let high_b = upload_project(&app, "High pull B", "Licensed", "High", TWO_ROW_CSV).await;
    // Different queue: must not appear in the Licensed listing
    upload_project(&app, "Other queue", "Nonlicensed", "High", TWO_ROW_CSV).await;

    let (status, body) = send_json(&app, "GET", "/projects/available?queue=Licensed", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["project_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![high_a.as_str(), high_b.as_str(), medium.as_str(), low.as_str()]);
}

#[tokio::test]
async fn claimed_project_leaves_the_available_listing() {
    let app = test_app().await;
    let id = upload_project(&app, "Pull", "Licensed", "High", TWO_ROW_CSV).await;
    claim_project(&app, &id, "reviewer1").await;

    let (_, body) = send_json(&app, "GET", "/projects/available?queue=Licensed", None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, project) = send_json(&app, "GET", &format!("/projects/{}", id), None).await;
    assert_eq!(project["status"], "InProgress");
    assert_eq!(project["assigned_reviewer"], "reviewer1");
    assert!(project["started_at"].is_string());
}

#[tokio::test]
async fn second_claim_gets_conflict() {
    let app = test_app().await;
    let id = upload_project(&app, "Pull", "Licensed", "High", TWO_ROW_CSV).await;
    claim_project(&app, &id, "reviewer1").await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/projects/{}/claim", id),
        Some(json!({ "reviewer_id": "reviewer2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn claim_of_unknown_project_gets_conflict() {
    let app = test_app().await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/projects/00000000-0000-0000-0000-000000000000/claim",
        Some(json!({ "reviewer_id": "reviewer1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn released_project_returns_to_the_queue() {
    let app = test_app().await;
    let id = upload_project(&app, "Pull", "Licensed", "High", TWO_ROW_CSV).await;
    claim_project(&app, &id, "reviewer1").await;

    let (status, body) =
        send_json(&app, "POST", &format!("/projects/{}/release", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Waiting");
    assert_eq!(body["assigned_reviewer"], serde_json::Value::Null);

    // Someone else can claim it now
    claim_project(&app, &id, "reviewer2").await;
}

#[tokio::test]
async fn release_of_waiting_project_is_a_conflict() {
    let app = test_app().await;
    let id = upload_project(&app, "Pull", "Licensed", "High", TWO_ROW_CSV).await;

    let (status, _) = send_json(&app, "POST", &format!("/projects/{}/release", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn export_requires_a_finished_review() {
    let app = test_app().await;
    let id = upload_project(&app, "Pull", "Licensed", "High", TWO_ROW_CSV).await;

    let (status, _, _) = send_raw(&app, "GET", &format!("/projects/{}/export", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let app = test_app().await;
    let (status, body) = send_json(
        &app,
        "GET",
        "/projects/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "fidorev-server");
}

#[tokio::test]
async fn analytics_on_empty_portal_is_all_zero() {
    let app = test_app().await;
    let (status, body) = send_json(&app, "GET", "/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_count"], 0);
    assert_eq!(body["total_edits"], 0);
    assert_eq!(body["average_review_seconds"], 0.0);
}
