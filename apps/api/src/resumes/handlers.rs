use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::service::{
    batch_analyze, compare_resumes, delete_resume, reanalyze_resume, require_resume,
    upload_resume, validate_upload, ResumeAnalysisView, ResumeComparison, UploadMode,
    UploadedFile,
};
use crate::state::AppState;

/// Multipart fields of an upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    user_id: Option<Uuid>,
    mode: UploadMode,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|f| !f.trim().is_empty())
                    .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                form.file = Some(UploadedFile { filename, data });
            }
            "user_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read user_id: {e}")))?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation(format!("Invalid user_id '{raw}'")))?;
                form.user_id = Some(id);
            }
            "mode" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read mode: {e}")))?;
                form.mode = UploadMode::parse(&raw)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub resume: ResumeRow,
}

/// POST /api/v1/resumes
/// `sync` answers 201 with the analyzed record; `async` answers 202 with the
/// pending record.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let user_id = form
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;

    let resume = upload_resume(&state, user_id, file, form.mode).await?;

    let (status, message) = match form.mode {
        UploadMode::Sync => (StatusCode::CREATED, "Resume uploaded and analyzed"),
        UploadMode::Async => (StatusCode::ACCEPTED, "Resume uploaded, analysis queued"),
    };
    Ok((
        status,
        Json(UploadResponse {
            message: message.to_string(),
            resume,
        }),
    ))
}

/// POST /api/v1/resumes/analyze
/// Analyzes the uploaded file without storing anything.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    validate_upload(&file.filename, file.data.len(), state.config.max_upload_bytes)?;

    let result = state
        .analyzer
        .clone()
        .analyze_bytes(file.data, file.filename)
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeAnalysisView>, AppError> {
    let resume = require_resume(&state, id).await?;
    Ok(Json(ResumeAnalysisView::from(&resume)))
}

#[derive(Deserialize)]
pub struct CompareQuery {
    pub first: Uuid,
    pub second: Uuid,
}

/// GET /api/v1/resumes/compare?first=&second=
pub async fn handle_compare(
    State(state): State<AppState>,
    Query(params): Query<CompareQuery>,
) -> Result<Json<ResumeComparison>, AppError> {
    let first = require_resume(&state, params.first).await?;
    let second = require_resume(&state, params.second).await?;
    Ok(Json(compare_resumes(&first, &second)))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_resume(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/reanalyze
pub async fn handle_reanalyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ResumeAnalysisView>), AppError> {
    let resume = reanalyze_resume(&state, id).await?;
    Ok((StatusCode::ACCEPTED, Json(ResumeAnalysisView::from(&resume))))
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub queued: usize,
}

/// POST /api/v1/resumes/batch-analyze
pub async fn handle_batch_analyze(
    State(state): State<AppState>,
) -> Result<Json<BatchResponse>, AppError> {
    let queued = batch_analyze(&state).await?;
    Ok(Json(BatchResponse { queued }))
}
