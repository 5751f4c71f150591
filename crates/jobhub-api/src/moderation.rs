use axum::{Extension, extract::State};
use tracing::info;
use uuid::Uuid;

use jobhub_types::api::{ModerateJobRequest, ModerationQuery, Page};
use jobhub_types::models::{Job, ModerationStatus, NotificationKind, Role};

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::notifications::notify;
use crate::state::{AppState, db_call};

const MODERATORS: &[Role] = &[Role::Admin, Role::Moderator];

/// Queue of jobs in one moderation state, `PENDING` unless asked otherwise.
pub async fn list_queue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ModerationQuery>,
) -> Result<Json<Page<Job>>, ApiError> {
    auth.require_role(MODERATORS)?;
    let page = query.pagination();
    let status = query.moderation_status.unwrap_or(ModerationStatus::Pending);
    let (items, total) =
        db_call(&state, move |db| db.list_jobs_by_moderation(status, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn moderate_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ModerateJobRequest>,
) -> Result<Json<Job>, ApiError> {
    auth.require_role(MODERATORS)?;

    let moderator_id = auth.id;
    let note = req.note.clone();
    let job = db_call(&state, move |db| {
        db.moderate_job(job_id, req.moderation_status, note.as_deref(), moderator_id)
    })
    .await?
    .ok_or(ApiError::NotFound("job"))?;
    info!("{} moderated job {} as {}", auth.email, job.id, job.moderation_status);

    let mut message = format!(
        "Your job \"{}\" was marked {}.",
        job.title, job.moderation_status
    );
    if let Some(note) = req.note.as_deref().filter(|n| !n.trim().is_empty()) {
        message.push_str(" Note: ");
        message.push_str(note.trim());
    }
    notify(
        &state,
        job.hr_id,
        NotificationKind::JobModerated,
        "Job moderation update",
        message,
        Some(job.id),
    )
    .await;

    Ok(Json(job))
}
