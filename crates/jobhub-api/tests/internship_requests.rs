//! University internship requests and company responses.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;

fn request_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Placements for final-year students",
        "field_of_study": "Computer Science",
        "student_count": 5,
        "start_date": "2027-06-01",
        "end_date": "2027-09-01",
    })
}

#[tokio::test]
async fn request_visibility_by_role() {
    let app = TestApp::new();
    let (uni, _) = app.register("uni@example.com", "UNIVERSITY").await;
    let (other_uni, _) = app.register("other@example.com", "UNIVERSITY").await;
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (candidate, _) = app.register("ada@example.com", "CANDIDATE").await;

    let (status, request) = app.post("/internship-requests", &uni, request_body("CS placements")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "PENDING");
    let uri = format!("/internship-requests/{}", request["id"].as_str().unwrap());
    app.post("/internship-requests", &other_uni, request_body("Other")).await;

    let (status, _) = app.post("/internship-requests", &hr, request_body("Nope")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, own) = app.get("/internship-requests", &uni).await;
    assert_eq!(own["total"], 1);
    let (_, all) = app.get("/internship-requests", &hr).await;
    assert_eq!(all["total"], 2);
    let (status, _) = app.get("/internship-requests", &candidate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&uri, &hr).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&uri, &other_uni).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut bad_dates = request_body("Backwards");
    bad_dates["end_date"] = json!("2027-01-01");
    let (status, _) = app.put(&uri, &uni, bad_dates).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app.put(&uri, &uni, request_body("CS placements 2027")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "CS placements 2027");
    let (status, _) = app.put(&uri, &other_uni, request_body("Hijack")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = app
        .patch(&format!("{}/status", uri), &uni, json!({ "status": "APPROVED" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "APPROVED");
    let (_, filtered) = app.get("/internship-requests?status=APPROVED", &hr).await;
    assert_eq!(filtered["total"], 1);

    let (status, _) = app.delete(&uri, &other_uni).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, &uni).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn company_responses_round_trip() {
    let app = TestApp::new();
    let (uni, _) = app.register("uni@example.com", "UNIVERSITY").await;
    let (hr, _) = app.register("hr@example.com", "HR").await;
    let (rival, _) = app.register("rival@example.com", "HR").await;
    app.put("/profile", &hr, json!({ "company_name": "Acme" })).await;

    let (_, request) = app.post("/internship-requests", &uni, request_body("CS placements")).await;
    let request_id = request["id"].as_str().unwrap();
    let responses_uri = format!("/internship-requests/{}/responses", request_id);

    let (status, response) = app
        .post(&responses_uri, &hr, json!({ "message": "We can host three", "offered_positions": 3 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["company_name"], "Acme");
    assert_eq!(response["status"], "PENDING");

    let (status, _) = app
        .post(&responses_uri, &hr, json!({ "message": "Again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    app.post(&responses_uri, &rival, json!({ "message": "One spot" })).await;

    let (_, notes) = app.get("/notifications", &uni).await;
    assert_eq!(notes["total"], 2);
    assert_eq!(notes["items"][1]["kind"], "COMPANY_RESPONSE_RECEIVED");

    let (_, seen_by_uni) = app.get(&responses_uri, &uni).await;
    assert_eq!(seen_by_uni.as_array().unwrap().len(), 2);
    let (_, seen_by_hr) = app.get(&responses_uri, &hr).await;
    assert_eq!(seen_by_hr.as_array().unwrap().len(), 1);

    let status_uri = format!("/company-responses/{}/status", response["id"].as_str().unwrap());
    let (status, _) = app.patch(&status_uri, &hr, json!({ "status": "ACCEPTED" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, accepted) = app.patch(&status_uri, &uni, json!({ "status": "ACCEPTED" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "ACCEPTED");

    let (_, notes) = app.get("/notifications", &hr).await;
    assert_eq!(notes["items"][0]["kind"], "COMPANY_RESPONSE_STATUS_CHANGED");

    // Closed requests take no further responses.
    app.patch(
        &format!("/internship-requests/{}/status", request_id),
        &uni,
        json!({ "status": "COMPLETED" }),
    )
    .await;
    let (late, _) = app.register("late@example.com", "HR").await;
    let (status, _) = app.post(&responses_uri, &late, json!({ "message": "Too late" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
