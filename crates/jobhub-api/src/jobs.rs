use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use jobhub_types::api::{JobInput, JobQuery, MyJobsQuery, Page, UpdateJobStatusRequest};
use jobhub_types::models::{Job, Role};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

/// Public listing: active, approved jobs only.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Page<Job>>, ApiError> {
    let page = query.pagination();
    let (items, total) = db_call(&state, move |db| db.list_public_jobs(&query, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

/// Public detail. Counts a view.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    let job = db_call(&state, move |db| {
        let job = db.get_job(job_id)?.filter(Job::is_public);
        if job.is_some() {
            db.increment_job_views(job_id)?;
        }
        Ok(job)
    })
    .await?
    .ok_or(ApiError::NotFound("job"))?;

    Ok(Json(Job {
        views_count: job.views_count + 1,
        ..job
    }))
}

pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MyJobsQuery>,
) -> Result<Json<Page<Job>>, ApiError> {
    auth.require_role(&[Role::Hr])?;
    let page = query.pagination();
    let hr_id = auth.id;
    let (items, total) =
        db_call(&state, move |db| db.list_jobs_by_hr(hr_id, &query, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn create_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<JobInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Hr])?;
    input.validate()?;
    let hr_id = auth.id;
    let job = db_call(&state, move |db| db.create_job(hr_id, &input)).await?;
    info!("{} created job {} ({})", auth.email, job.id, job.status);
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
    Json(input): Json<JobInput>,
) -> Result<Json<Job>, ApiError> {
    let job = load_job(&state, job_id).await?;
    auth.require_owner(job.hr_id)?;
    input.validate()?;
    let job = db_call(&state, move |db| db.update_job(job_id, &input))
        .await?
        .ok_or(ApiError::NotFound("job"))?;
    Ok(Json(job))
}

pub async fn update_job_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<UpdateJobStatusRequest>,
) -> Result<Json<Job>, ApiError> {
    let job = load_job(&state, job_id).await?;
    auth.require_owner_or_admin(job.hr_id)?;
    let job = db_call(&state, move |db| db.set_job_status(job_id, req.status))
        .await?
        .ok_or(ApiError::NotFound("job"))?;
    Ok(Json(job))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let job = load_job(&state, job_id).await?;
    auth.require_owner_or_admin(job.hr_id)?;
    db_call(&state, move |db| db.delete_job(job_id)).await?;
    info!("{} deleted job {}", auth.email, job_id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn load_job(state: &AppState, job_id: Uuid) -> Result<Job, ApiError> {
    db_call(state, move |db| db.get_job(job_id))
        .await?
        .ok_or(ApiError::NotFound("job"))
}
