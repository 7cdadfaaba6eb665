use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::ml_client::MlClient;
use crate::scrape::JobScraper;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every client here is constructed once at startup and shared
/// read-only — no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub ml: MlClient,
    pub scraper: Arc<JobScraper>,
    pub config: Config,
}
