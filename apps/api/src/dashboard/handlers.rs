use axum::{extract::State, Json};

use crate::dashboard::{compute_stats, recent_activity, ActivityEvent, DashboardStats, ACTIVITY_LIMIT};
use crate::errors::AppError;
use crate::models::application::ApplicationRecord;
use crate::models::job::JobRecord;
use crate::models::resume::StoredResume;
use crate::state::AppState;

async fn load_all(
    state: &AppState,
) -> Result<(Vec<StoredResume>, Vec<JobRecord>, Vec<ApplicationRecord>), AppError> {
    tokio::try_join!(
        state.storage.resumes.list(),
        state.storage.jobs.list(),
        state.storage.applications.list(),
    )
    .map_err(AppError::storage)
}

/// GET /api/v1/dashboard/stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let (resumes, jobs, applications) = load_all(&state).await?;
    Ok(Json(compute_stats(&resumes, &jobs, &applications)))
}

/// GET /api/v1/dashboard/activity
pub async fn handle_activity(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityEvent>>, AppError> {
    let (resumes, jobs, applications) = load_all(&state).await?;
    Ok(Json(recent_activity(
        &resumes,
        &jobs,
        &applications,
        ACTIVITY_LIMIT,
    )))
}
