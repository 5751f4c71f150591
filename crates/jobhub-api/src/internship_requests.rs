use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use jobhub_types::api::{
    CompanyResponseInput, InternshipRequestInput, InternshipRequestQuery, Page,
    UpdateCompanyResponseStatusRequest, UpdateInternshipRequestStatusRequest,
};
use jobhub_types::models::{
    CompanyResponse, InternshipRequest, InternshipRequestStatus, NotificationKind, Role,
};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::notifications::notify;
use crate::state::{AppState, db_call};

// -- University requests --

pub async fn create_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<InternshipRequestInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::University])?;
    input.validate()?;
    let university_id = auth.id;
    let request =
        db_call(&state, move |db| db.create_internship_request(university_id, &input)).await?;
    info!("{} opened internship request {}", auth.email, request.id);
    Ok((StatusCode::CREATED, Json(request)))
}

/// Universities see their own requests; companies and staff see all of them.
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<InternshipRequestQuery>,
) -> Result<Json<Page<InternshipRequest>>, ApiError> {
    let scope = match auth.role {
        Role::University => Some(auth.id),
        Role::Hr | Role::Admin | Role::Moderator => None,
        Role::Candidate => return Err(ApiError::Forbidden("insufficient role")),
    };
    let page = query.pagination();
    let status = query.status;
    let (items, total) =
        db_call(&state, move |db| db.list_internship_requests(scope, status, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn get_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<InternshipRequest>, ApiError> {
    let request = load_request(&state, request_id).await?;
    let allowed = request.university_id == auth.id || auth.role == Role::Hr || auth.role.is_staff();
    if !allowed {
        return Err(ApiError::Forbidden("not allowed to view this request"));
    }
    Ok(Json(request))
}

pub async fn update_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(input): Json<InternshipRequestInput>,
) -> Result<Json<InternshipRequest>, ApiError> {
    let request = load_request(&state, request_id).await?;
    auth.require_owner(request.university_id)?;
    input.validate()?;
    let request = db_call(&state, move |db| db.update_internship_request(request_id, &input))
        .await?
        .ok_or(ApiError::NotFound("internship request"))?;
    Ok(Json(request))
}

pub async fn update_request_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<UpdateInternshipRequestStatusRequest>,
) -> Result<Json<InternshipRequest>, ApiError> {
    let request = load_request(&state, request_id).await?;
    auth.require_owner_or_admin(request.university_id)?;
    let request = db_call(&state, move |db| db.set_internship_request_status(request_id, req.status))
        .await?
        .ok_or(ApiError::NotFound("internship request"))?;
    Ok(Json(request))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let request = load_request(&state, request_id).await?;
    auth.require_owner_or_admin(request.university_id)?;
    db_call(&state, move |db| db.delete_internship_request(request_id)).await?;
    info!("{} deleted internship request {}", auth.email, request_id);
    Ok(StatusCode::NO_CONTENT)
}

// -- Company responses --

pub async fn create_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(input): Json<CompanyResponseInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Hr])?;
    input.validate()?;
    let request = load_request(&state, request_id).await?;
    if is_closed(request.status) {
        return Err(ApiError::BadRequest(format!(
            "internship request is {}",
            request.status
        )));
    }

    let hr_id = auth.id;
    let response = db_call(&state, move |db| db.create_company_response(request_id, hr_id, &input))
        .await
        .map_err(|e| e.on_conflict("you have already responded to this request"))?;
    info!("{} responded to internship request {}", auth.email, request_id);

    let company = response.company_name.as_deref().unwrap_or("A company");
    notify(
        &state,
        request.university_id,
        NotificationKind::CompanyResponseReceived,
        "New company response",
        format!(
            "{} offered {} position(s) for \"{}\".",
            company, response.offered_positions, request.title
        ),
        Some(response.id),
    )
    .await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The owning university and staff see every response; HR users see their own.
pub async fn list_responses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Vec<CompanyResponse>>, ApiError> {
    let request = load_request(&state, request_id).await?;
    let hr_scope = if request.university_id == auth.id || auth.role.is_staff() {
        None
    } else if auth.role == Role::Hr {
        Some(auth.id)
    } else {
        return Err(ApiError::Forbidden("not allowed to view these responses"));
    };
    let responses =
        db_call(&state, move |db| db.list_company_responses(request_id, hr_scope)).await?;
    Ok(Json(responses))
}

pub async fn update_response_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(response_id): Path<Uuid>,
    Json(req): Json<UpdateCompanyResponseStatusRequest>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let response = db_call(&state, move |db| db.get_company_response(response_id))
        .await?
        .ok_or(ApiError::NotFound("company response"))?;
    let request = load_request(&state, response.request_id).await?;
    auth.require_owner(request.university_id)?;

    let response = db_call(&state, move |db| db.set_company_response_status(response_id, req.status))
        .await?
        .ok_or(ApiError::NotFound("company response"))?;
    info!("{} set company response {} to {}", auth.email, response.id, response.status);

    notify(
        &state,
        response.hr_id,
        NotificationKind::CompanyResponseStatusChanged,
        "Response status updated",
        format!(
            "Your response to \"{}\" is now {}.",
            request.title, response.status
        ),
        Some(response.id),
    )
    .await;
    Ok(Json(response))
}

fn is_closed(status: InternshipRequestStatus) -> bool {
    matches!(
        status,
        InternshipRequestStatus::Rejected
            | InternshipRequestStatus::Completed
            | InternshipRequestStatus::Cancelled
    )
}

async fn load_request(state: &AppState, request_id: Uuid) -> Result<InternshipRequest, ApiError> {
    db_call(state, move |db| db.get_internship_request(request_id))
        .await?
        .ok_or(ApiError::NotFound("internship request"))
}
