//! Notification inbox, broadcasts and analytics.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn broadcast_and_inbox() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let (_, inactive_id) = app.register("gone@example.com", "CANDIDATE").await;
    app.patch(&format!("/users/{}/status", inactive_id), &admin, json!({ "is_active": false }))
        .await;

    let (status, _) = app
        .post("/notifications/broadcast", &hr, json!({ "title": "Hi", "message": "There" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, sent) = app
        .post(
            "/notifications/broadcast",
            &admin,
            json!({ "title": "Maintenance", "message": "Tonight at 22:00", "role": "CANDIDATE" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["delivered"], 1);

    let (_, sent) = app
        .post("/notifications/broadcast", &admin, json!({ "title": "Hello", "message": "Everyone" }))
        .await;
    // Admin, HR and the active candidate.
    assert_eq!(sent["delivered"], 3);

    let (_, count) = app.get("/notifications/unread-count", &candidate).await;
    assert_eq!(count["count"], 2);
    let (_, inbox) = app.get("/notifications", &candidate).await;
    assert_eq!(inbox["items"][0]["title"], "Hello");
    assert_eq!(inbox["items"][0]["kind"], "SYSTEM");

    // Someone else's notification looks missing.
    let first = inbox["items"][0]["id"].as_str().unwrap();
    let (status, _) = app
        .request(
            axum::http::Method::PATCH,
            &format!("/notifications/{}/read", first),
            Some(&hr),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, read) = app
        .request(
            axum::http::Method::PATCH,
            &format!("/notifications/{}/read", first),
            Some(&candidate),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);

    let (_, done) = app.post("/notifications/read-all", &candidate, json!({})).await;
    assert_eq!(done["updated"], 1);
    let (_, count) = app.get("/notifications/unread-count", &candidate).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn analytics_by_role() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let moderator = app.moderator("mod@example.com").await;
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let job = app.public_job(&hr, "Backend Engineer").await;
    app.post(&format!("/jobs/{}/applications", job), &candidate, json!({})).await;

    let (status, overview) = app.get("/analytics/overview", &moderator).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["total_users"], 4);
    assert_eq!(overview["users_by_role"]["MODERATOR"], 1);
    assert_eq!(overview["jobs_by_moderation_status"]["APPROVED"], 1);
    assert_eq!(overview["applications_by_status"]["PENDING"], 1);

    let (status, _) = app.get("/analytics/overview", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/analytics/overview", &hr).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = app.get("/analytics/hr", &hr).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["jobs_total"], 1);
    assert_eq!(stats["applications_total"], 1);
    let (status, _) = app.get("/analytics/hr", &candidate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
