use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use jobhub_db::queries::ApplicationFilter;
use jobhub_types::api::{
    AnalysisRequest, ApplicationQuery, ApplyRequest, Page, UpdateApplicationStatusRequest,
};
use jobhub_types::models::{Application, ApplicationStatus, NotificationKind, Role};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::internships::load_internship;
use crate::jobs::load_job;
use crate::middleware::AuthUser;
use crate::notifications::notify;
use crate::state::{AppState, db_call};

// -- Candidate side --

pub async fn apply_to_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Candidate])?;
    req.validate()?;
    let job = load_job(&state, job_id).await?;
    if !job.is_public() {
        return Err(ApiError::NotFound("job"));
    }

    let candidate_id = auth.id;
    let application = db_call(&state, move |db| db.create_job_application(candidate_id, job_id, &req))
        .await
        .map_err(|e| e.on_conflict("you have already applied to this job"))?;
    info!("{} applied to job {}", auth.email, job_id);

    notify(
        &state,
        job.hr_id,
        NotificationKind::ApplicationReceived,
        "New application",
        format!("{} applied to \"{}\".", application.candidate_name, job.title),
        Some(application.id),
    )
    .await;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn apply_to_internship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(internship_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Candidate])?;
    req.validate()?;
    let internship = load_internship(&state, internship_id).await?;
    if !internship.is_public() {
        return Err(ApiError::NotFound("internship"));
    }

    let candidate_id = auth.id;
    let application = db_call(&state, move |db| {
        db.create_internship_application(candidate_id, internship_id, &req)
    })
    .await
    .map_err(|e| e.on_conflict("you have already applied to this internship"))?;
    info!("{} applied to internship {}", auth.email, internship_id);

    notify(
        &state,
        internship.hr_id,
        NotificationKind::ApplicationReceived,
        "New application",
        format!("{} applied to \"{}\".", application.candidate_name, internship.title),
        Some(application.id),
    )
    .await;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn my_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Page<Application>>, ApiError> {
    auth.require_role(&[Role::Candidate])?;
    list(&state, ApplicationFilter::Candidate(auth.id), query).await
}

pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Application>, ApiError> {
    let application = load_application(&state, application_id).await?;
    if application.candidate_id != auth.id {
        return Err(ApiError::Forbidden("only the applicant can withdraw"));
    }
    let application = db_call(&state, move |db| {
        db.set_application_status(application_id, ApplicationStatus::Withdrawn, None)
    })
    .await?
    .ok_or(ApiError::NotFound("application"))?;
    Ok(Json(application))
}

// -- Posting owner side --

pub async fn job_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Page<Application>>, ApiError> {
    let job = load_job(&state, job_id).await?;
    auth.require_owner_or_admin(job.hr_id)?;
    list(&state, ApplicationFilter::Job(job_id), query).await
}

pub async fn internship_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(internship_id): Path<Uuid>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Page<Application>>, ApiError> {
    let internship = load_internship(&state, internship_id).await?;
    auth.require_owner_or_admin(internship.hr_id)?;
    list(&state, ApplicationFilter::Internship(internship_id), query).await
}

pub async fn get_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<Application>, ApiError> {
    let application = load_application(&state, application_id).await?;
    if application.candidate_id != auth.id {
        require_posting_owner(&state, &auth, application_id).await?;
    }
    Ok(Json(application))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<Application>, ApiError> {
    load_application(&state, application_id).await?;
    require_posting_owner(&state, &auth, application_id).await?;

    let application = db_call(&state, move |db| {
        db.set_application_status(application_id, req.status, req.notes.as_deref())
    })
    .await?
    .ok_or(ApiError::NotFound("application"))?;
    info!("{} set application {} to {}", auth.email, application.id, application.status);

    notify(
        &state,
        application.candidate_id,
        NotificationKind::ApplicationStatusChanged,
        "Application status updated",
        format!(
            "Your application for \"{}\" is now {}.",
            application.posting_title, application.status
        ),
        Some(application.id),
    )
    .await;
    Ok(Json(application))
}

/// Sends the application and its posting to the analysis service and relays the verdict.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let application = load_application(&state, application_id).await?;
    require_posting_owner(&state, &auth, application_id).await?;

    let Some(client) = state.analysis.as_ref() else {
        return Err(ApiError::ServiceUnavailable("analysis service is not configured"));
    };

    let job = match application.job_id {
        Some(id) => Some(load_job(&state, id).await?),
        None => None,
    };
    let internship = match application.internship_id {
        Some(id) => Some(load_internship(&state, id).await?),
        None => None,
    };
    let payload = AnalysisRequest {
        application,
        job,
        internship,
    };

    let verdict = client.analyze(&payload).await.map_err(|e| {
        warn!("Analysis of application {} failed: {:#}", application_id, e);
        ApiError::BadGateway(e.to_string())
    })?;
    Ok(Json(verdict))
}

async fn list(
    state: &AppState,
    target: ApplicationFilter,
    query: ApplicationQuery,
) -> Result<Json<Page<Application>>, ApiError> {
    let page = query.pagination();
    let status = query.status;
    let (items, total) =
        db_call(state, move |db| db.list_applications(target, status, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

async fn load_application(state: &AppState, application_id: Uuid) -> Result<Application, ApiError> {
    db_call(state, move |db| db.get_application(application_id))
        .await?
        .ok_or(ApiError::NotFound("application"))
}

/// HR owner of the targeted posting, or an admin.
async fn require_posting_owner(
    state: &AppState,
    auth: &AuthUser,
    application_id: Uuid,
) -> Result<(), ApiError> {
    if auth.is_admin() {
        return Ok(());
    }
    let owner = db_call(state, move |db| db.application_posting_owner(application_id)).await?;
    match owner {
        Some(owner) => auth.require_owner(owner),
        None => Err(ApiError::Forbidden("not the owner of this resource")),
    }
}
