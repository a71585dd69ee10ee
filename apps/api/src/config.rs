use std::path::PathBuf;
use std::str::FromStr;

use std::ops::RangeInclusive;

use anyhow::{ensure, Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const RETENTION_DAYS_RANGE: RangeInclusive<i64> = 0..=36_500;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// JSON taxonomy file; the built-in table is used when unset.
    pub taxonomy_path: Option<PathBuf>,
    pub analysis_max_retries: u32,
    pub analysis_retry_delay_secs: u64,
    pub resume_retention_days: i64,
    pub cleanup_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            taxonomy_path: std::env::var("TAXONOMY_PATH").ok().map(PathBuf::from),
            analysis_max_retries: env_or("ANALYSIS_MAX_RETRIES", 3)?,
            analysis_retry_delay_secs: env_or("ANALYSIS_RETRY_DELAY_SECS", 60)?,
            resume_retention_days: in_range(
                "RESUME_RETENTION_DAYS",
                env_or("RESUME_RETENTION_DAYS", 90)?,
                RETENTION_DAYS_RANGE,
            )?,
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", 86_400)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
    }
}

fn in_range(key: &str, value: i64, range: RangeInclusive<i64>) -> Result<i64> {
    ensure!(
        range.contains(&value),
        "{key} must be between {} and {}, got {value}",
        range.start(),
        range.end()
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_uses_default() {
        let port: u16 = parse_or("PORT", None, 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_present_value_is_parsed() {
        let bytes: usize = parse_or("MAX_UPLOAD_BYTES", Some(" 1048576 ".to_string()), 0).unwrap();
        assert_eq!(bytes, 1_048_576);
    }

    #[test]
    fn test_malformed_value_names_variable() {
        let err = parse_or::<u16>("PORT", Some("eighty".to_string()), 8080).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_retention_days_must_be_in_range() {
        assert_eq!(in_range("RESUME_RETENTION_DAYS", 90, RETENTION_DAYS_RANGE).unwrap(), 90);
        assert_eq!(in_range("RESUME_RETENTION_DAYS", 0, RETENTION_DAYS_RANGE).unwrap(), 0);

        let negative = in_range("RESUME_RETENTION_DAYS", -1, RETENTION_DAYS_RANGE).unwrap_err();
        assert!(negative.to_string().contains("RESUME_RETENTION_DAYS"));
        assert!(in_range("RESUME_RETENTION_DAYS", i64::MAX, RETENTION_DAYS_RANGE).is_err());
    }
}
