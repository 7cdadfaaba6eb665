use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails fast if required variables are missing; scraping
/// strategy flags are resolved here once, never re-read at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub ml_service_url: String,
    pub upload_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    /// Headless-browser scraping fallback (strategy 2). On unless set to "false".
    pub enable_headless_fallback: bool,
    /// WebDriver scraping fallback (strategy 3). Off unless set to "true".
    pub enable_webdriver_fallback: bool,
    pub webdriver_url: String,
    pub webdriver_wait_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            ml_service_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            enable_headless_fallback: std::env::var("ENABLE_HEADLESS_FALLBACK")
                .map(|v| v != "false")
                .unwrap_or(true),
            enable_webdriver_fallback: std::env::var("ENABLE_WEBDRIVER_FALLBACK")
                .map(|v| v == "true")
                .unwrap_or(false),
            webdriver_url: std::env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:4444".to_string()),
            webdriver_wait_ms: std::env::var("WEBDRIVER_WAIT_MS")
                .unwrap_or_else(|_| "2500".to_string())
                .parse::<u64>()
                .context("WEBDRIVER_WAIT_MS must be a number of milliseconds")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
