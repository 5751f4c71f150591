use axum::{Extension, extract::State};
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use jobhub_types::api::{
    CandidateProfileInput, HrProfileInput, Page, SetSkillsRequest, UniversityProfileInput,
    UpdateUserRoleRequest, UpdateUserStatusRequest, UserQuery,
};
use jobhub_types::models::{Profile, Role, User};

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

// -- Admin user management --

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    auth.require_role(&[Role::Admin])?;
    let page = query.pagination();
    let (items, total) = db_call(&state, move |db| db.list_users(&query, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    if auth.id != user_id {
        auth.require_role(&[Role::Admin])?;
    }
    let user = db_call(&state, move |db| db.get_user(user_id))
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserStatusRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require_role(&[Role::Admin])?;
    if user_id == auth.id && !req.is_active {
        return Err(ApiError::BadRequest("you cannot deactivate your own account".into()));
    }
    let user = db_call(&state, move |db| db.set_user_active(user_id, req.is_active))
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    info!("{} set is_active={} on {}", auth.email, user.is_active, user.email);
    Ok(Json(user))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require_role(&[Role::Admin])?;
    if user_id == auth.id && req.role != Role::Admin {
        return Err(ApiError::BadRequest("you cannot remove your own admin role".into()));
    }
    let user = db_call(&state, move |db| db.set_user_role(user_id, req.role))
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    info!("{} changed role of {} to {}", auth.email, user.email, user.role);
    Ok(Json(user))
}

// -- Own profile --

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Profile>, ApiError> {
    let profile = db_call(&state, move |db| db.get_profile(auth.id, auth.role))
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

/// The body shape depends on the caller's role.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Profile>, ApiError> {
    let user_id = auth.id;
    let profile = match auth.role {
        Role::Candidate => {
            let input: CandidateProfileInput = parse_body(body)?;
            db_call(&state, move |db| db.update_candidate_profile(user_id, &input)).await?
        }
        Role::Hr => {
            let input: HrProfileInput = parse_body(body)?;
            db_call(&state, move |db| db.update_hr_profile(user_id, &input)).await?
        }
        Role::University => {
            let input: UniversityProfileInput = parse_body(body)?;
            db_call(&state, move |db| db.update_university_profile(user_id, &input)).await?
        }
        Role::Admin | Role::Moderator => None,
    };
    profile.map(Json).ok_or(ApiError::NotFound("profile"))
}

pub async fn set_profile_skills(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SetSkillsRequest>,
) -> Result<Json<Profile>, ApiError> {
    auth.require_role(&[Role::Candidate])?;
    let user_id = auth.id;
    let profile = db_call(&state, move |db| {
        if !db.set_candidate_skills(user_id, &req.skill_ids)? {
            return Ok(Err(ApiError::BadRequest("unknown skill id".into())));
        }
        Ok(db.get_profile(user_id, Role::Candidate)?.ok_or(ApiError::NotFound("profile")))
    })
    .await??;
    Ok(Json(profile))
}

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("invalid profile: {}", e)))
}
