pub mod analysis;
pub mod analytics;
pub mod applications;
pub mod auth;
pub mod error;
pub mod extract;
pub mod internship_requests;
pub mod internships;
pub mod jobs;
pub mod middleware;
pub mod moderation;
pub mod notifications;
pub mod skills;
pub mod state;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All HTTP routes. Public routes skip the auth layer; everything else
/// requires a bearer token for an active account.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/skills", get(skills::list_skills))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/internships", get(internships::list_internships))
        .route("/internships/{id}", get(internships::get_internship));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Users & profiles
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/status", patch(users::update_user_status))
        .route("/users/{id}/role", patch(users::update_user_role))
        .route("/profile", get(users::get_profile).put(users::update_profile))
        .route("/profile/skills", put(users::set_profile_skills))
        // Skills
        .route("/skills", post(skills::create_skill))
        .route("/skills/{id}", axum::routing::delete(skills::delete_skill))
        // Jobs
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/mine", get(jobs::my_jobs))
        .route("/jobs/{id}", put(jobs::update_job).delete(jobs::delete_job))
        .route("/jobs/{id}/status", patch(jobs::update_job_status))
        .route(
            "/jobs/{id}/applications",
            get(applications::job_applications).post(applications::apply_to_job),
        )
        // Moderation
        .route("/moderation/jobs", get(moderation::list_queue))
        .route("/moderation/jobs/{id}", patch(moderation::moderate_job))
        // Internships
        .route("/internships", post(internships::create_internship))
        .route("/internships/mine", get(internships::my_internships))
        .route(
            "/internships/{id}",
            put(internships::update_internship).delete(internships::delete_internship),
        )
        .route("/internships/{id}/status", patch(internships::update_internship_status))
        .route(
            "/internships/{id}/applications",
            get(applications::internship_applications).post(applications::apply_to_internship),
        )
        // Applications
        .route("/applications/mine", get(applications::my_applications))
        .route("/applications/{id}", get(applications::get_application))
        .route("/applications/{id}/status", patch(applications::update_status))
        .route("/applications/{id}/withdraw", post(applications::withdraw))
        .route("/applications/{id}/analysis", post(applications::analyze))
        // Internship requests
        .route(
            "/internship-requests",
            get(internship_requests::list_requests).post(internship_requests::create_request),
        )
        .route(
            "/internship-requests/{id}",
            get(internship_requests::get_request)
                .put(internship_requests::update_request)
                .delete(internship_requests::delete_request),
        )
        .route(
            "/internship-requests/{id}/status",
            patch(internship_requests::update_request_status),
        )
        .route(
            "/internship-requests/{id}/responses",
            get(internship_requests::list_responses).post(internship_requests::create_response),
        )
        .route(
            "/company-responses/{id}/status",
            patch(internship_requests::update_response_status),
        )
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/broadcast", post(notifications::broadcast))
        .route("/notifications/{id}/read", patch(notifications::mark_read))
        // Analytics
        .route("/analytics/overview", get(analytics::overview))
        .route("/analytics/hr", get(analytics::hr))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
