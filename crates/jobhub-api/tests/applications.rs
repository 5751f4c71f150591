//! Applying, reviewing and analysing applications.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use jobhub_api::analysis::AnalysisClient;

use common::{TestApp, internship_body};

#[tokio::test]
async fn apply_review_and_withdraw() {
    let app = TestApp::new();
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, candidate_id) = app.register("ada@example.com", "CANDIDATE").await;
    let (other, _) = app.register("bob@example.com", "CANDIDATE").await;
    let job = app.public_job(&hr, "Backend Engineer").await;

    let (status, application) = app
        .post(
            &format!("/jobs/{}/applications", job),
            &candidate,
            json!({ "cover_letter": "I love Rust" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "PENDING");
    assert_eq!(application["candidate_id"], candidate_id.as_str());
    assert_eq!(application["posting_title"], "Backend Engineer");
    let app_uri = format!("/applications/{}", application["id"].as_str().unwrap());

    let (status, _) = app
        .post(&format!("/jobs/{}/applications", job), &candidate, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // HR is told about the new application and can list it.
    let (_, notes) = app.get("/notifications", &hr).await;
    assert_eq!(notes["items"][0]["kind"], "APPLICATION_RECEIVED");
    let (status, listed) = app.get(&format!("/jobs/{}/applications", job), &hr).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["items"][0]["candidate_email"], "ada@example.com");

    let (status, _) = app.get(&app_uri, &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&app_uri, &hr).await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = app
        .patch(
            &format!("{}/status", app_uri),
            &hr,
            json!({ "status": "INTERVIEW_SCHEDULED", "notes": "Call on Monday" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "INTERVIEW_SCHEDULED");
    assert_eq!(updated["notes"], "Call on Monday");

    let (status, _) = app
        .patch(&format!("{}/status", app_uri), &candidate, json!({ "status": "HIRED" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .patch(&format!("{}/status", app_uri), &hr, json!({ "status": "MAYBE" }))
        .await;
    assert!(status.is_client_error());

    let (_, notes) = app.get("/notifications?unread_only=true", &candidate).await;
    assert_eq!(notes["total"], 1);
    assert_eq!(notes["items"][0]["kind"], "APPLICATION_STATUS_CHANGED");

    let (status, _) = app.post(&format!("{}/withdraw", app_uri), &other, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, withdrawn) = app.post(&format!("{}/withdraw", app_uri), &candidate, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(withdrawn["status"], "WITHDRAWN");

    let (_, mine) = app.get("/applications/mine?status=WITHDRAWN", &candidate).await;
    assert_eq!(mine["total"], 1);
}

#[tokio::test]
async fn only_candidates_apply_to_open_postings() {
    let app = TestApp::new();
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let draft = app.create_job(&hr, "Hidden", "DRAFT").await;
    let public = app.public_job(&hr, "Open").await;

    let (status, _) = app
        .post(&format!("/jobs/{}/applications", draft), &candidate, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post(&format!("/jobs/{}/applications", public), &hr, json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/jobs/{}/applications", public), &candidate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn internship_applications() {
    let app = TestApp::new();
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let (_, internship) = app.post("/internships", &hr, internship_body("Summer intern", "ACTIVE")).await;
    let id = internship["id"].as_str().unwrap();

    let (status, application) = app
        .post(&format!("/internships/{}/applications", id), &candidate, json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["internship_id"], id);
    assert!(application["job_id"].is_null());

    let (status, _) = app
        .post(&format!("/internships/{}/applications", id), &candidate, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listed) = app.get(&format!("/internships/{}/applications", id), &hr).await;
    assert_eq!(listed["total"], 1);

    let (_, paused) = app
        .patch(&format!("/internships/{}/status", id), &hr, json!({ "status": "PAUSED" }))
        .await;
    assert_eq!(paused["status"], "PAUSED");
    let (other, _) = app.register("bob@example.com", "CANDIDATE").await;
    let (status, _) = app
        .post(&format!("/internships/{}/applications", id), &other, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analysis_without_service_is_unavailable() {
    let app = TestApp::new();
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let job = app.public_job(&hr, "Backend Engineer").await;
    let (_, application) = app
        .post(&format!("/jobs/{}/applications", job), &candidate, json!({}))
        .await;
    let uri = format!("/applications/{}/analysis", application["id"].as_str().unwrap());

    let (status, _) = app.post(&uri, &candidate, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.post(&uri, &hr, json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "analysis service is not configured");
}

#[tokio::test]
async fn unreachable_analysis_service_is_a_bad_gateway() {
    // Nothing listens on port 1.
    let client = AnalysisClient::new("http://127.0.0.1:1", 2).unwrap();
    let app = TestApp::with_analysis(Some(client));
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;
    let job = app.public_job(&hr, "Backend Engineer").await;
    let (_, application) = app
        .post(&format!("/jobs/{}/applications", job), &candidate, json!({}))
        .await;

    let admin = app.admin().await;
    let (status, _) = app
        .post(
            &format!("/applications/{}/analysis", application["id"].as_str().unwrap()),
            &admin,
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
