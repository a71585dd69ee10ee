//! Background analysis queue on a Redis list, plus periodic cleanup.
//!
//! - Producers `LPUSH` JSON jobs onto `QUEUE_KEY`; one worker task `BRPOP`s.
//! - Rejected input (bad format, corrupt file) fails the record immediately.
//! - Infrastructure failures (DB, S3, Redis) are re-queued after a delay
//!   until `analysis_max_retries` is spent.

use std::time::Duration;

use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{AnalysisStatus, ResumeRow};
use crate::resumes::repository;
use crate::resumes::service::{analyze_stored, require_resume};
use crate::resumes::storage;
use crate::state::AppState;

pub const QUEUE_KEY: &str = "resume_analysis:queue";

const POLL_TIMEOUT_SECS: f64 = 5.0;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub resume_id: Uuid,
    /// Retries already spent on this resume; 0 for a fresh job.
    #[serde(default)]
    pub attempt: u32,
}

impl AnalysisJob {
    pub fn new(resume_id: Uuid) -> Self {
        Self {
            resume_id,
            attempt: 0,
        }
    }

    fn next_attempt(&self) -> Self {
        Self {
            resume_id: self.resume_id,
            attempt: self.attempt + 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(AnalysisJob),
    /// Record must be marked failed by the worker.
    Fail,
    /// Nothing left to update (record already failed or gone).
    Drop,
}

/// Decides what to do with a job whose run returned `error`.
pub fn retry_decision(job: &AnalysisJob, error: &AppError, max_retries: u32) -> RetryDecision {
    match error {
        // analyze_stored already marked the record failed.
        AppError::Analysis(e) if e.is_rejected_input() => RetryDecision::Drop,
        AppError::NotFound(_) => RetryDecision::Drop,
        AppError::Validation(_) => RetryDecision::Fail,
        _ if job.attempt < max_retries => RetryDecision::Retry(job.next_attempt()),
        _ => RetryDecision::Fail,
    }
}

pub async fn enqueue(redis: &redis::Client, job: &AnalysisJob) -> Result<(), AppError> {
    let payload = serde_json::to_string(job).map_err(anyhow::Error::from)?;
    let mut con = redis.get_multiplexed_async_connection().await?;
    con.lpush::<_, _, ()>(QUEUE_KEY, payload).await?;
    Ok(())
}

/// Spawns the single queue consumer. Runs for the life of the process and
/// reconnects to Redis on connection loss.
pub fn spawn_worker(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Resume analysis worker listening on {QUEUE_KEY}");
        loop {
            let mut con = match state.redis.get_multiplexed_async_connection().await {
                Ok(con) => con,
                Err(e) => {
                    error!("Analysis worker could not connect to Redis: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                }
            };

            loop {
                let popped: Option<(String, String)> =
                    match con.brpop(QUEUE_KEY, POLL_TIMEOUT_SECS).await {
                        Ok(popped) => popped,
                        Err(e) => {
                            warn!("Analysis worker lost Redis connection: {e}");
                            break;
                        }
                    };
                let Some((_, payload)) = popped else {
                    continue;
                };

                match serde_json::from_str::<AnalysisJob>(&payload) {
                    Ok(job) => process_job(&state, job).await,
                    Err(e) => warn!("Dropping malformed analysis job {payload:?}: {e}"),
                }
            }

            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

async fn process_job(state: &AppState, job: AnalysisJob) {
    info!(
        "Starting resume analysis for resume {} (attempt {})",
        job.resume_id,
        job.attempt + 1
    );

    let error = match run_job(state, &job).await {
        Ok(resume) => {
            info!(
                "Resume analysis completed for resume {}: score={:?}",
                resume.id, resume.total_score
            );
            return;
        }
        Err(e) => e,
    };

    match retry_decision(&job, &error, state.config.analysis_max_retries) {
        RetryDecision::Retry(next) => {
            warn!(
                "Error analyzing resume {}: {error}; retry {} of {} in {}s",
                job.resume_id, next.attempt, state.config.analysis_max_retries,
                state.config.analysis_retry_delay_secs
            );
            schedule_retry(
                state.redis.clone(),
                next,
                Duration::from_secs(state.config.analysis_retry_delay_secs),
            );
        }
        RetryDecision::Fail => {
            error!("Giving up on resume {}: {error}", job.resume_id);
            if let Err(e) = repository::set_status(
                &state.db,
                job.resume_id,
                AnalysisStatus::Failed,
                Some(&error.to_string()),
            )
            .await
            {
                error!("Could not mark resume {} failed: {e}", job.resume_id);
            }
        }
        RetryDecision::Drop => warn!("Analysis job for resume {} dropped: {error}", job.resume_id),
    }
}

async fn run_job(state: &AppState, job: &AnalysisJob) -> Result<ResumeRow, AppError> {
    let resume = require_resume(state, job.resume_id).await?;
    let data = storage::fetch(&state.s3, &state.config.s3_bucket, &resume.s3_key).await?;
    analyze_stored(state, &resume, data).await
}

fn schedule_retry(redis: redis::Client, job: AnalysisJob, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = enqueue(&redis, &job).await {
            error!("Could not re-queue resume {}: {e}", job.resume_id);
        }
    });
}

/// Spawns the periodic purge of soft-deleted resumes past retention.
pub fn spawn_cleanup(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(state.config.cleanup_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let retention_days = state.config.resume_retention_days;
            let Some(cutoff) = retention_cutoff(Utc::now(), retention_days) else {
                error!("Retention of {retention_days} days is out of range; skipping cleanup");
                continue;
            };
            match repository::purge_deleted_before(&state.db, cutoff).await {
                Ok(count) => info!("Deleted {count} old resumes (retention {retention_days} days)"),
                Err(e) => error!("Error cleaning up old resumes: {e}"),
            }
        }
    })
}

/// Oldest `created_at` kept. `None` for negative or unrepresentable spans.
fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> Option<DateTime<Utc>> {
    if retention_days < 0 {
        return None;
    }
    now.checked_sub_signed(chrono::TimeDelta::try_days(retention_days)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisError;

    #[test]
    fn test_job_payload_shape() {
        let job = AnalysisJob::new(Uuid::nil());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["attempt"], 0);

        let parsed: AnalysisJob =
            serde_json::from_str(r#"{"resume_id": "00000000-0000-0000-0000-000000000000"}"#)
                .unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn test_infrastructure_errors_retry_until_budget_spent() {
        let job = AnalysisJob::new(Uuid::nil());
        let err = AppError::S3("timeout".to_string());

        match retry_decision(&job, &err, 3) {
            RetryDecision::Retry(next) => assert_eq!(next.attempt, 1),
            other => panic!("expected retry, got {other:?}"),
        }

        let last = AnalysisJob {
            resume_id: Uuid::nil(),
            attempt: 3,
        };
        assert_eq!(retry_decision(&last, &err, 3), RetryDecision::Fail);
    }

    #[test]
    fn test_rejected_input_is_never_retried() {
        let job = AnalysisJob::new(Uuid::nil());
        let err = AppError::Analysis(AnalysisError::Extraction {
            format: "PDF",
            reason: "broken".to_string(),
        });
        assert_eq!(retry_decision(&job, &err, 3), RetryDecision::Drop);
    }

    #[test]
    fn test_panicked_analysis_is_retried() {
        let job = AnalysisJob::new(Uuid::nil());
        let err = AppError::Analysis(AnalysisError::Internal("task cancelled".to_string()));
        assert!(matches!(
            retry_decision(&job, &err, 3),
            RetryDecision::Retry(_)
        ));
    }

    #[test]
    fn test_missing_resume_is_dropped() {
        let job = AnalysisJob::new(Uuid::nil());
        let err = AppError::NotFound("Resume gone".to_string());
        assert_eq!(retry_decision(&job, &err, 3), RetryDecision::Drop);
    }

    #[test]
    fn test_retention_cutoff_rejects_bad_spans() {
        let now = Utc::now();
        assert_eq!(
            retention_cutoff(now, 90),
            Some(now - chrono::TimeDelta::days(90))
        );
        assert_eq!(retention_cutoff(now, 0), Some(now));
        assert_eq!(retention_cutoff(now, -1), None);
        assert_eq!(retention_cutoff(now, i64::MAX), None);
    }

    #[test]
    fn test_zero_retry_budget_fails_immediately() {
        let job = AnalysisJob::new(Uuid::nil());
        let err = AppError::Internal(anyhow::anyhow!("pool closed"));
        assert_eq!(retry_decision(&job, &err, 0), RetryDecision::Fail);
    }
}
