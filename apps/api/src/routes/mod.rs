pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resumes::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the non-file form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes", post(handlers::handle_upload))
        .route("/api/v1/resumes/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resumes/compare", get(handlers::handle_compare))
        .route(
            "/api/v1/resumes/batch-analyze",
            post(handlers::handle_batch_analyze),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_analysis).delete(handlers::handle_delete),
        )
        .route(
            "/api/v1/resumes/:id/reanalyze",
            post(handlers::handle_reanalyze),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::ResumeAnalyzer;
    use crate::config::Config;

    const BOUNDARY: &str = "career-api-test-boundary";

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/career_test".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://127.0.0.1:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            max_upload_bytes: 1024,
            taxonomy_path: None,
            analysis_max_retries: 3,
            analysis_retry_delay_secs: 60,
            resume_retention_days: 90,
            cleanup_interval_secs: 86_400,
        }
    }

    /// State whose backends are never contacted by the routes under test.
    fn test_app() -> Router {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let redis = redis::Client::open(config.redis_url.clone()).unwrap();
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let s3 = aws_sdk_s3::Client::from_conf(s3_config);

        build_router(AppState {
            db,
            redis,
            s3,
            config,
            analyzer: Arc::new(ResumeAnalyzer::with_builtin_tables()),
        })
    }

    fn multipart_request(uri: &str, filename: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {contents}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "career-api");
    }

    #[tokio::test]
    async fn test_stateless_analyze_returns_result() {
        let request = multipart_request(
            "/api/v1/resumes/analyze",
            "resume.txt",
            "Python, React, Docker, 3 years of experience",
        );
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["skill_score"], 30);
        assert_eq!(body["experience_level"], "junior");
        assert_eq!(body["found_skills"][0]["name"], "Python");
        assert_eq!(body["gaps"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_analyze_rejects_unknown_extension() {
        let request = multipart_request("/api/v1/resumes/analyze", "skills.xls", "python");
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_rejects_oversize_file() {
        let request = multipart_request("/api/v1/resumes/analyze", "cv.txt", &"a".repeat(2048));
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("too large"));
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_unprocessable() {
        let request = multipart_request("/api/v1/resumes/analyze", "cv.docx", "not a zip");
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected_before_storage() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"user_id\"\r\n\r\n\
             00000000-0000-0000-0000-000000000001\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "No file provided");
    }
}
