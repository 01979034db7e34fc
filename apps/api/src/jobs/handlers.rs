use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeJobRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobRecord>,
}

/// POST /api/v1/jobs
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeJobRequest>,
) -> Result<(StatusCode, Json<JobRecord>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }

    let job = JobRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        company: non_blank(req.company),
        location: non_blank(req.location),
        requirements: state.analyzer.analyze(title, &req.description),
        description: req.description,
        analyzed_at: Utc::now(),
    };
    state
        .storage
        .jobs
        .insert(job.id, &job)
        .await
        .map_err(AppError::storage)?;

    info!(
        job_id = %job.id,
        title = %job.title,
        required = job.requirements.required_skills.len(),
        "job analyzed"
    );
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let mut jobs = state.storage.jobs.list().await.map_err(AppError::storage)?;
    jobs.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRecord>, AppError> {
    Ok(Json(fetch_job(&state, id).await?))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .jobs
        .remove(id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    info!(job_id = %id, "job deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn fetch_job(state: &AppState, id: Uuid) -> Result<JobRecord, AppError> {
    state
        .storage
        .jobs
        .get(id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
