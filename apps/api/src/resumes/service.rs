//! Resume upload and analysis orchestration.
//!
//! The analysis engine itself is pure; everything stateful (record status,
//! stored binaries, skill profile, job queue) happens here.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::{AnalysisError, DocumentFormat};
use crate::errors::AppError;
use crate::models::resume::{AnalysisStatus, ResumeRow};
use crate::resumes::jobs::{enqueue, AnalysisJob};
use crate::resumes::repository::{self, NewResume};
use crate::resumes::skills::sync_user_skills;
use crate::resumes::storage;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &str = ".pdf, .docx, .doc, .txt";

/// Whether the upload request waits for the analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Sync,
    Async,
}

impl UploadMode {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "" | "sync" => Ok(UploadMode::Sync),
            "async" => Ok(UploadMode::Async),
            other => Err(AppError::Validation(format!(
                "mode must be 'sync' or 'async', got '{other}'"
            ))),
        }
    }
}

pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Size and extension policy applied before anything is stored.
pub fn validate_upload(
    filename: &str,
    size: usize,
    max_bytes: usize,
) -> Result<DocumentFormat, AppError> {
    if size > max_bytes {
        return Err(AppError::Validation(format!(
            "File is too large (max {} bytes)",
            max_bytes
        )));
    }
    DocumentFormat::from_filename(filename).map_err(|_| {
        AppError::Validation(format!("Invalid file type. Allowed: {ALLOWED_EXTENSIONS}"))
    })
}

/// Stores the upload and either analyzes it inline or queues it.
pub async fn upload_resume(
    state: &AppState,
    user_id: Uuid,
    file: UploadedFile,
    mode: UploadMode,
) -> Result<ResumeRow, AppError> {
    let format = validate_upload(&file.filename, file.data.len(), state.config.max_upload_bytes)?;

    let resume_id = Uuid::new_v4();
    let s3_key = storage::object_key(user_id, resume_id, format);
    storage::upload(
        &state.s3,
        &state.config.s3_bucket,
        &s3_key,
        file.data.clone(),
        format,
    )
    .await?;

    let status = match mode {
        UploadMode::Sync => AnalysisStatus::Analyzing,
        UploadMode::Async => AnalysisStatus::Pending,
    };
    let resume = repository::insert_resume(
        &state.db,
        NewResume {
            id: resume_id,
            user_id,
            original_filename: &file.filename,
            file_type: format.extension(),
            file_size: file.data.len() as i64,
            s3_key: &s3_key,
            status,
        },
    )
    .await?;
    info!("Created resume {resume_id} for user {user_id} ({mode:?})");

    match mode {
        UploadMode::Sync => analyze_stored(state, &resume, file.data).await,
        UploadMode::Async => {
            enqueue(&state.redis, &AnalysisJob::new(resume_id)).await?;
            Ok(resume)
        }
    }
}

/// Runs the analysis for a stored resume and records the outcome.
///
/// On failure the record is marked `failed` with the error message and the
/// error is returned; nothing else is written.
pub async fn analyze_stored(
    state: &AppState,
    resume: &ResumeRow,
    data: Bytes,
) -> Result<ResumeRow, AppError> {
    repository::set_status(&state.db, resume.id, AnalysisStatus::Analyzing, None).await?;

    let outcome = state
        .analyzer
        .clone()
        .analyze_bytes(data, resume.original_filename.clone())
        .await;

    match outcome {
        Ok(result) => {
            let updated = repository::store_analysis(&state.db, resume.id, &result).await?;
            sync_user_skills(&state.db, resume.user_id, &result.found_skills).await;
            info!(
                "Resume {} analyzed for user {}: score={}",
                resume.id, resume.user_id, result.total_score
            );
            Ok(updated)
        }
        Err(e) => {
            error!("Error analyzing resume {} for user {}: {e}", resume.id, resume.user_id);
            Err(record_failure(&state.db, resume.id, e).await)
        }
    }
}

/// Marks the resume failed and hands back the analysis error. A failed
/// status write is only logged so the caller still sees the original cause.
async fn record_failure(pool: &PgPool, id: Uuid, error: AnalysisError) -> AppError {
    if let Err(db_err) =
        repository::set_status(pool, id, AnalysisStatus::Failed, Some(&error.to_string())).await
    {
        error!("Could not mark resume {id} failed: {db_err}");
    }
    error.into()
}

pub async fn require_resume(state: &AppState, id: Uuid) -> Result<ResumeRow, AppError> {
    repository::get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Puts a stored resume back in the queue.
pub async fn reanalyze_resume(state: &AppState, id: Uuid) -> Result<ResumeRow, AppError> {
    let resume = require_resume(state, id).await?;
    repository::set_status(&state.db, id, AnalysisStatus::Pending, None).await?;
    enqueue(&state.redis, &AnalysisJob::new(id)).await?;
    info!("Queued resume {id} for re-analysis");
    Ok(ResumeRow {
        analysis_status: AnalysisStatus::Pending.as_str().to_string(),
        analysis_error: None,
        ..resume
    })
}

/// Queues every pending resume. Returns how many were queued.
pub async fn batch_analyze(state: &AppState) -> Result<usize, AppError> {
    let ids = repository::pending_resume_ids(&state.db).await?;
    for id in &ids {
        enqueue(&state.redis, &AnalysisJob::new(*id)).await?;
    }
    info!("Queued {} resumes for analysis", ids.len());
    Ok(ids.len())
}

/// Removes the stored binary, then soft-deletes the record.
pub async fn delete_resume(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let resume = require_resume(state, id).await?;
    storage::remove(&state.s3, &state.config.s3_bucket, &resume.s3_key).await?;
    if !repository::soft_delete(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    info!("Resume {id} deleted");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Read models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysisView {
    pub resume_id: Uuid,
    pub status: String,
    pub original_filename: String,
    pub extracted_skills: Value,
    pub skill_gaps: Value,
    pub experience_level: Option<String>,
    pub skill_score: Option<i32>,
    pub total_score: Option<f64>,
    pub analysis_error: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl From<&ResumeRow> for ResumeAnalysisView {
    fn from(row: &ResumeRow) -> Self {
        Self {
            resume_id: row.id,
            status: row.analysis_status.clone(),
            original_filename: row.original_filename.clone(),
            extracted_skills: row.skills.clone(),
            skill_gaps: row.skill_gaps.clone(),
            experience_level: row.experience_level.clone(),
            skill_score: row.skill_score,
            total_score: row.total_score,
            analysis_error: row.analysis_error.clone(),
            analyzed_at: row.analyzed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeComparison {
    pub first_id: Uuid,
    pub second_id: Uuid,
    pub first_unique_skills: Vec<String>,
    pub second_unique_skills: Vec<String>,
    pub common_skills: Vec<String>,
    pub first_score: f64,
    pub second_score: f64,
    pub score_difference: f64,
}

/// Set difference of the two resumes' skill names, compared
/// case-insensitively. Lists are sorted; unanalyzed resumes score 0.
pub fn compare_resumes(first: &ResumeRow, second: &ResumeRow) -> ResumeComparison {
    let first_skills = skill_names(&first.skills);
    let second_skills = skill_names(&second.skills);

    let only_in = |a: &BTreeMap<String, String>, b: &BTreeMap<String, String>| -> Vec<String> {
        a.iter()
            .filter(|(key, _)| !b.contains_key(*key))
            .map(|(_, name)| name.clone())
            .collect()
    };

    let common_skills = first_skills
        .iter()
        .filter(|(key, _)| second_skills.contains_key(*key))
        .map(|(_, name)| name.clone())
        .collect();

    let first_score = first.total_score.unwrap_or(0.0);
    let second_score = second.total_score.unwrap_or(0.0);

    ResumeComparison {
        first_id: first.id,
        second_id: second.id,
        first_unique_skills: only_in(&first_skills, &second_skills),
        second_unique_skills: only_in(&second_skills, &first_skills),
        common_skills,
        first_score,
        second_score,
        score_difference: (first_score - second_score).abs(),
    }
}

/// Lowercased name → display name, from a stored `skills` JSON array.
fn skill_names(skills: &Value) -> BTreeMap<String, String> {
    skills
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.get("name").and_then(|n| n.as_str()))
                .map(|name| (name.to_lowercase(), name.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
