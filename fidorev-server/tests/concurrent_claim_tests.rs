//! Concurrent claim integration tests
//!
//! The claim transition is the one place a race must be excluded: when
//! several reviewers go for the same Waiting project at once, exactly
//! one claim succeeds and the rest see a conflict.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;

use fidorev_server::build_router;
use helpers::*;

const CSV: &str = "brand\nAcme\nZyx\n";

#[tokio::test]
async fn concurrent_claims_admit_exactly_one_reviewer() {
    let state = test_state(Arc::new(FailingSuggester)).await;
    let app = build_router(state);

    let project_id = upload_project(&app, "Contended pull", "Licensed", "High", CSV).await;

    let mut join_set = JoinSet::new();
    for i in 0..8 {
        let app = app.clone();
        let project_id = project_id.clone();
        join_set.spawn(async move {
            let (status, _) = send_json(
                &app,
                "POST",
                &format!("/projects/{}/claim", project_id),
                Some(json!({ "reviewer_id": format!("reviewer{}", i) })),
            )
            .await;
            status
        });
    }

    let mut won = 0;
    let mut lost = 0;
    while let Some(result) = join_set.join_next().await {
        match result.unwrap() {
            StatusCode::OK => won += 1,
            StatusCode::CONFLICT => lost += 1,
            other => panic!("unexpected claim status: {}", other),
        }
    }

    assert_eq!(won, 1, "exactly one concurrent claim must win");
    assert_eq!(lost, 7);

    // The project is held by exactly one reviewer
    let (_, project) = send_json(&app, "GET", &format!("/projects/{}", project_id), None).await;
    assert_eq!(project["status"], "InProgress");
    assert!(project["assigned_reviewer"]
        .as_str()
        .unwrap()
        .starts_with("reviewer"));
}

#[tokio::test]
async fn claim_after_release_alternates_cleanly() {
    let state = test_state(Arc::new(FailingSuggester)).await;
    let app = build_router(state);

    let project_id = upload_project(&app, "Pull", "Licensed", "High", CSV).await;

    for round in 0..3 {
        claim_project(&app, &project_id, &format!("reviewer{}", round)).await;
        let (status, _) =
            send_json(&app, "POST", &format!("/projects/{}/release", project_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, project) = send_json(&app, "GET", &format!("/projects/{}", project_id), None).await;
    assert_eq!(project["status"], "Waiting");
}
