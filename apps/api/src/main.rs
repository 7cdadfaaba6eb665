mod analyzer;
mod config;
mod db;
mod errors;
mod extract;
mod llm_client;
mod matching;
mod ml_client;
mod models;
mod routes;
mod scrape;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::ml_client::MlClient;
use crate::routes::build_router;
use crate::scrape::JobScraper;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobLens API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Make sure the upload directory exists before the first multipart lands
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory: {}", config.upload_dir.display());

    // Initialize the LLM client (skill extraction + job-fit analysis)
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the ML parsing service client (best-effort collaborator)
    let ml = MlClient::new(config.ml_service_url.clone());
    info!("ML parsing client initialized ({})", config.ml_service_url);

    // Assemble the scraping strategy chain from config flags
    let scraper = Arc::new(JobScraper::from_config(&config));
    info!(
        "Job scraper initialized (strategies: {})",
        scraper.strategy_names().join(" -> ")
    );

    // Build app state
    let state = AppState {
        db,
        llm,
        ml,
        scraper,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
