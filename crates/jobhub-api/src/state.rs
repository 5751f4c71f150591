use std::sync::Arc;

use jobhub_db::Database;

use crate::analysis::AnalysisClient;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Unset when no analysis service URL is configured.
    pub analysis: Option<AnalysisClient>,
}

/// Runs a blocking database call off the async runtime.
pub async fn db_call<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(ApiError::from)
}
