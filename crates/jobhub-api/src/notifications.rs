use axum::{Extension, extract::State};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use jobhub_types::api::{
    BroadcastRequest, BroadcastResponse, NotificationQuery, Page, UnreadCountResponse,
};
use jobhub_types::models::{Notification, NotificationKind, Role};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

/// Records a notification for `user_id`. Failures are logged, never surfaced.
pub(crate) async fn notify(
    state: &AppState,
    user_id: Uuid,
    kind: NotificationKind,
    title: &str,
    message: String,
    related_id: Option<Uuid>,
) {
    let title = title.to_string();
    let result = db_call(state, move |db| {
        db.create_notification(user_id, kind, &title, &message, related_id)
    })
    .await;
    if let Err(e) = result {
        warn!("Failed to notify {} ({}): {}", user_id, kind, e);
    }
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Page<Notification>>, ApiError> {
    let page = query.pagination();
    let unread_only = query.unread_only.unwrap_or(false);
    let (items, total) =
        db_call(&state, move |db| db.list_notifications(auth.id, unread_only, page)).await?;
    Ok(Json(Page::new(items, total, page)))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = db_call(&state, move |db| db.unread_notification_count(auth.id)).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let notification = db_call(&state, move |db| db.mark_notification_read(notification_id, auth.id))
        .await?
        .ok_or(ApiError::NotFound("notification"))?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = db_call(&state, move |db| db.mark_all_notifications_read(auth.id)).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn broadcast(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    auth.require_role(&[Role::Admin])?;
    req.validate()?;
    let delivered = db_call(&state, move |db| {
        let recipients = db.active_user_ids(req.role)?;
        db.broadcast_notification(&recipients, req.title.trim(), req.message.trim())
    })
    .await?;
    info!("{} broadcast a notice to {} users", auth.email, delivered);
    Ok(Json(BroadcastResponse { delivered }))
}
