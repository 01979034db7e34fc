use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::handlers::score_pair;
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date_applied: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationRecord>,
}

/// POST /api/v1/applications
/// Both referenced records must exist; the current match score is captured.
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRecord>), AppError> {
    let result = score_pair(&state, req.resume_id, req.job_id).await?;

    let now = Utc::now();
    let application = ApplicationRecord {
        id: Uuid::new_v4(),
        resume_id: req.resume_id,
        job_id: req.job_id,
        status: req.status.unwrap_or(ApplicationStatus::Applied),
        notes: req.notes,
        date_applied: req.date_applied.unwrap_or(now),
        match_score: Some(as_percent(result.overall_score)),
        created_at: now,
        updated_at: now,
    };
    state
        .storage
        .applications
        .insert(application.id, &application)
        .await
        .map_err(AppError::storage)?;

    info!(
        application_id = %application.id,
        status = ?application.status,
        "application created"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<ApplicationListResponse>, AppError> {
    let mut applications = state
        .storage
        .applications
        .list()
        .await
        .map_err(AppError::storage)?;
    applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(ApplicationListResponse { applications }))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationRecord>, AppError> {
    state
        .storage
        .applications
        .get(id)
        .await
        .map_err(AppError::storage)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/v1/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationRecord>, AppError> {
    if req.status.is_none() && req.notes.is_none() {
        return Err(AppError::Validation(
            "Provide a status or notes to update".to_string(),
        ));
    }

    let updated = state
        .storage
        .applications
        .update(id, |app| {
            if let Some(status) = req.status {
                app.status = status;
            }
            if let Some(notes) = req.notes {
                app.notes = Some(notes);
            }
            app.updated_at = Utc::now();
        })
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| not_found(id))?;

    info!(application_id = %id, status = ?updated.status, "application updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .applications
        .remove(id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| not_found(id))?;
    info!(application_id = %id, "application deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

/// 0–1 aggregate as a 0–100 score with one decimal.
fn as_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_percent_rounds_to_one_decimal() {
        assert_eq!(as_percent(0.0), 0.0);
        assert_eq!(as_percent(1.0), 100.0);
        assert_eq!(as_percent(0.72349), 72.3);
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let req: UpdateApplicationRequest = serde_json::from_str(r#"{"status":"Offered"}"#).unwrap();
        assert_eq!(req.status, Some(ApplicationStatus::Offered));
        assert_eq!(req.notes, None);
    }
}
