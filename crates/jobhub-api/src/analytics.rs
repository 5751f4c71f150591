use axum::{Extension, extract::State};

use jobhub_types::api::{AnalyticsOverview, HrAnalytics};
use jobhub_types::models::Role;

use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalyticsOverview>, ApiError> {
    auth.require_role(&[Role::Admin, Role::Moderator])?;
    let overview = db_call(&state, |db| db.analytics_overview()).await?;
    Ok(Json(overview))
}

/// Figures over the caller's own postings.
pub async fn hr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<HrAnalytics>, ApiError> {
    auth.require_role(&[Role::Hr])?;
    let stats = db_call(&state, move |db| db.hr_analytics(auth.id)).await?;
    Ok(Json(stats))
}
