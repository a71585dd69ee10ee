//! SQL access for the `resumes` table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::models::resume::{AnalysisStatus, ResumeRow};

/// Fields known at upload time, before any analysis has run.
pub struct NewResume<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: &'a str,
    pub file_type: &'a str,
    pub file_size: i64,
    pub s3_key: &'a str,
    pub status: AnalysisStatus,
}

pub async fn insert_resume(pool: &PgPool, new: NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, original_filename, file_type, file_size, s3_key, analysis_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(new.original_filename)
    .bind(new.file_type)
    .bind(new.file_size)
    .bind(new.s3_key)
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await
}

/// Returns the resume unless it does not exist or was soft-deleted.
pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND NOT is_deleted")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: AnalysisStatus,
    error: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE resumes
        SET analysis_status = $2, analysis_error = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes a complete analysis and marks the resume completed.
pub async fn store_analysis(
    pool: &PgPool,
    id: Uuid,
    result: &AnalysisResult,
) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes
        SET extracted_text = $2,
            skills = $3,
            skill_gaps = $4,
            experience_level = $5,
            skill_score = $6,
            total_score = $7,
            analysis_status = $8,
            analysis_error = NULL,
            analyzed_at = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&result.truncated_text)
    .bind(Json(&result.found_skills))
    .bind(Json(&result.gaps))
    .bind(result.experience_level.as_str())
    .bind(result.skill_score as i32)
    .bind(result.total_score)
    .bind(AnalysisStatus::Completed.as_str())
    .fetch_one(pool)
    .await
}

/// Flags the resume deleted. Returns false if it was already gone.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE resumes SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn pending_resume_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM resumes WHERE analysis_status = $1 AND NOT is_deleted ORDER BY created_at",
    )
    .bind(AnalysisStatus::Pending.as_str())
    .fetch_all(pool)
    .await
}

/// Hard-deletes soft-deleted resumes uploaded before `cutoff`.
pub async fn purge_deleted_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE is_deleted AND created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
