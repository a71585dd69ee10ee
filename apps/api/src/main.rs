mod analysis;
mod config;
mod db;
mod errors;
mod models;
mod resumes;
mod routes;
mod state;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{RecommendationTable, ResumeAnalyzer, SkillTaxonomy};
use crate::config::Config;
use crate::db::create_pool;
use crate::resumes::jobs::{spawn_cleanup, spawn_worker};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Skill taxonomy: configured file, or the built-in table
    let taxonomy = match &config.taxonomy_path {
        Some(path) => SkillTaxonomy::load(path)
            .with_context(|| format!("Failed to load taxonomy from {}", path.display()))?,
        None => SkillTaxonomy::builtin(),
    };
    if taxonomy.is_empty() {
        warn!("Skill taxonomy is empty; no skills will be matched");
    } else {
        info!("Skill taxonomy loaded ({} entries)", taxonomy.len());
    }

    let analyzer = Arc::new(ResumeAnalyzer::new(
        Arc::new(taxonomy),
        Arc::new(RecommendationTable::builtin()),
    ));

    // Build app state
    let state = AppState {
        db,
        redis,
        s3,
        config: config.clone(),
        analyzer,
    };

    // Background analysis worker and retention cleanup
    spawn_worker(state.clone());
    spawn_cleanup(state.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "career-api-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
