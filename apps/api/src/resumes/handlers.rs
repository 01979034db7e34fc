use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{load_text, DocumentFormat, RawDocument};
use crate::errors::AppError;
use crate::models::resume::StoredResume;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<StoredResume>,
}

/// POST /api/v1/resumes
/// Multipart upload. Nothing is persisted unless text extraction succeeds.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredResume>), AppError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let doc = RawDocument::new(filename, bytes)?;

    // PDF/DOCX parsing is CPU-bound and may panic on hostile input.
    let extractor = state.extractor.clone();
    let parse_doc = doc.clone();
    let record = tokio::task::spawn_blocking(move || {
        load_text(&parse_doc).map(|text| extractor.extract(&text))
    })
    .await
    .map_err(|e| {
        warn!(filename = %doc.filename, "document parser task failed: {e}");
        AppError::CorruptDocument(format!("'{}' could not be parsed", doc.filename))
    })??;

    let stored = StoredResume {
        id: Uuid::new_v4(),
        filename: doc.filename.clone(),
        size_bytes: doc.bytes.len() as u64,
        uploaded_at: Utc::now(),
        record,
    };
    let key = stored.id.to_string();

    state
        .storage
        .blobs
        .put(&key, doc.bytes.clone())
        .await
        .map_err(AppError::storage)?;
    if let Err(e) = state.storage.resumes.insert(stored.id, &stored).await {
        if let Err(cleanup) = state.storage.blobs.delete(&key).await {
            warn!(resume_id = %stored.id, "orphaned upload left behind: {cleanup:#}");
        }
        return Err(AppError::storage(e));
    }

    info!(
        resume_id = %stored.id,
        filename = %stored.filename,
        skills = stored.record.skills.len(),
        flags = stored.record.review_flags.len(),
        "resume uploaded"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let mut resumes = state
        .storage
        .resumes
        .list()
        .await
        .map_err(AppError::storage)?;
    resumes.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredResume>, AppError> {
    Ok(Json(fetch_resume(&state, id).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .resumes
        .remove(id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let had_blob = state
        .storage
        .blobs
        .delete(&id.to_string())
        .await
        .map_err(AppError::storage)?;
    info!(resume_id = %id, had_blob, "resume deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = fetch_resume(&state, id).await?;
    let bytes = state
        .storage
        .blobs
        .get(&id.to_string())
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("Original file for resume {id} not found")))?;

    let content_type = DocumentFormat::from_filename(&resume.filename)
        .map(|f| f.content_type())
        .unwrap_or("application/octet-stream");
    let disposition = format!(
        "attachment; filename=\"{}\"",
        resume.filename.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub(crate) async fn fetch_resume(state: &AppState, id: Uuid) -> Result<StoredResume, AppError> {
    state
        .storage
        .resumes
        .get(id)
        .await
        .map_err(AppError::storage)?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// The `file` part of the upload, with any client-side directory stripped from its name.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart body"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .and_then(|name| name.rsplit(['/', '\\']).next())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Could not read upload"))?;
        if bytes.is_empty() {
            return Err(AppError::Validation(format!("'{filename}' is empty")));
        }
        return Ok((filename, bytes));
    }
    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

/// Body-limit overflows become 413; any other multipart failure is a bad request.
fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: upload exceeds the size limit"))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}
