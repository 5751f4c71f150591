//! Shared harness: the full router over a private in-memory database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use jobhub_api::analysis::AnalysisClient;
use jobhub_api::{AppState, AppStateInner, router};
use jobhub_db::Database;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_analysis(None)
    }

    pub fn with_analysis(analysis: Option<AnalysisClient>) -> Self {
        let db = Database::open_in_memory().unwrap();
        jobhub_api::auth::bootstrap_admin(&db, ADMIN_EMAIL, PASSWORD).unwrap();
        let state: AppState = Arc::new(AppStateInner {
            db,
            jwt_secret: "integration-test-secret".into(),
            token_ttl_hours: 1,
            analysis,
        });
        Self {
            router: router(state.clone()),
            state,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a self-service account and returns `(token, user id)`.
    pub async fn register(&self, email: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "first_name": "Test",
                    "last_name": role,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", email, body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login {}: {}", email, body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin(&self) -> String {
        self.login(ADMIN_EMAIL).await
    }

    /// A candidate account promoted to MODERATOR by the admin.
    pub async fn moderator(&self, email: &str) -> String {
        let (token, id) = self.register(email, "CANDIDATE").await;
        let admin = self.admin().await;
        let (status, _) = self
            .patch(&format!("/users/{}/role", id), &admin, json!({ "role": "MODERATOR" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        token
    }

    /// Creates a job as `hr` and returns its id.
    pub async fn create_job(&self, hr: &str, title: &str, status: &str) -> String {
        let (code, body) = self.post("/jobs", hr, job_body(title, status)).await;
        assert_eq!(code, StatusCode::CREATED, "create job: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates an ACTIVE job and has a moderator approve it.
    pub async fn public_job(&self, hr: &str, title: &str) -> String {
        let id = self.create_job(hr, title, "ACTIVE").await;
        let admin = self.admin().await;
        let (code, _) = self
            .patch(
                &format!("/moderation/jobs/{}", id),
                &admin,
                json!({ "moderation_status": "APPROVED" }),
            )
            .await;
        assert_eq!(code, StatusCode::OK);
        id
    }
}

pub fn job_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Build and run services",
        "company_name": "Acme",
        "location": "Berlin",
        "job_type": "FULL_TIME",
        "experience_level": "MID",
        "salary_min": 50000,
        "salary_max": 70000,
        "skills": ["Rust", "SQL"],
        "status": status,
    })
}

pub fn internship_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Summer placement",
        "company_name": "Acme",
        "duration_months": 3,
        "positions": 2,
        "status": status,
    })
}
