use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub s3_key: String,
    /// Preview of the extracted text, capped at 1000 characters.
    pub extracted_text: String,
    pub skills: Value,
    pub skill_gaps: Value,
    pub experience_level: Option<String>,
    pub skill_score: Option<i32>,
    pub total_score: Option<f64>,
    pub analysis_status: String,
    pub analysis_error: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a stored resume's analysis: pending → analyzing → completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Analyzing => "analyzing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }
}
