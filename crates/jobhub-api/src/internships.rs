use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use jobhub_types::api::{
    InternshipInput, InternshipQuery, Page, PageQuery, UpdateInternshipStatusRequest,
};
use jobhub_types::models::{Internship, Role};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

pub async fn list_internships(
    State(state): State<AppState>,
    Query(query): Query<InternshipQuery>,
) -> Result<Json<Page<Internship>>, ApiError> {
    let page = query.pagination();
    let (items, total) =
        db_call(&state, move |db| db.list_public_internships(&query, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn get_internship(
    State(state): State<AppState>,
    Path(internship_id): Path<Uuid>,
) -> Result<Json<Internship>, ApiError> {
    let internship = load_internship(&state, internship_id).await?;
    if !internship.is_public() {
        return Err(ApiError::NotFound("internship"));
    }
    Ok(Json(internship))
}

pub async fn my_internships(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Internship>>, ApiError> {
    auth.require_role(&[Role::Hr])?;
    let page = query.pagination();
    let (items, total) =
        db_call(&state, move |db| db.list_internships_by_hr(auth.id, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn create_internship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<InternshipInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Hr])?;
    input.validate()?;
    let hr_id = auth.id;
    let internship = db_call(&state, move |db| db.create_internship(hr_id, &input)).await?;
    info!("{} created internship {}", auth.email, internship.id);
    Ok((StatusCode::CREATED, Json(internship)))
}

pub async fn update_internship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(internship_id): Path<Uuid>,
    Json(input): Json<InternshipInput>,
) -> Result<Json<Internship>, ApiError> {
    let internship = load_internship(&state, internship_id).await?;
    auth.require_owner(internship.hr_id)?;
    input.validate()?;
    let internship = db_call(&state, move |db| db.update_internship(internship_id, &input))
        .await?
        .ok_or(ApiError::NotFound("internship"))?;
    Ok(Json(internship))
}

pub async fn update_internship_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(internship_id): Path<Uuid>,
    Json(req): Json<UpdateInternshipStatusRequest>,
) -> Result<Json<Internship>, ApiError> {
    let internship = load_internship(&state, internship_id).await?;
    auth.require_owner_or_admin(internship.hr_id)?;
    let internship = db_call(&state, move |db| db.set_internship_status(internship_id, req.status))
        .await?
        .ok_or(ApiError::NotFound("internship"))?;
    Ok(Json(internship))
}

pub async fn delete_internship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(internship_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let internship = load_internship(&state, internship_id).await?;
    auth.require_owner_or_admin(internship.hr_id)?;
    db_call(&state, move |db| db.delete_internship(internship_id)).await?;
    info!("{} deleted internship {}", auth.email, internship_id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn load_internship(
    state: &AppState,
    internship_id: Uuid,
) -> Result<Internship, ApiError> {
    db_call(state, move |db| db.get_internship(internship_id))
        .await?
        .ok_or(ApiError::NotFound("internship"))
}
