use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use jobhub_types::api::{CreateSkillRequest, SkillQuery};
use jobhub_types::models::{Role, Skill};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

pub async fn list_skills(
    State(state): State<AppState>,
    Query(query): Query<SkillQuery>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = db_call(&state, move |db| db.list_skills(query.category.as_deref())).await?;
    Ok(Json(skills))
}

pub async fn create_skill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Admin, Role::Hr])?;
    req.validate()?;
    let skill = db_call(&state, move |db| db.create_skill(&req.name, req.category.as_deref()))
        .await
        .map_err(|e| e.on_conflict("skill already exists"))?;
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn delete_skill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(skill_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_role(&[Role::Admin])?;
    if db_call(&state, move |db| db.delete_skill(skill_id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("skill"))
    }
}
