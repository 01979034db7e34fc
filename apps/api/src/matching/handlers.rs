use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::handlers::fetch_job;
use crate::matching::MatchResult;
use crate::resumes::handlers::fetch_resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let result = score_pair(&state, req.resume_id, req.job_id).await?;
    Ok(Json(result))
}

/// Loads both records (404 on either) and scores them.
pub(crate) async fn score_pair(
    state: &AppState,
    resume_id: Uuid,
    job_id: Uuid,
) -> Result<MatchResult, AppError> {
    let resume = fetch_resume(state, resume_id).await?;
    let job = fetch_job(state, job_id).await?;
    let result = state.scorer.score(&resume, &job).await;
    info!(
        %resume_id,
        %job_id,
        overall = result.overall_score,
        missing = result.missing_skills.len(),
        "match scored"
    );
    Ok(result)
}
