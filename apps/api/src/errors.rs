use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::scrape::ScrapeError;

/// User-facing hint returned whenever every scraping strategy failed.
const SCRAPE_HINT: &str =
    "Failed to fetch the job posting. Try URLs from LinkedIn, Indeed, Naukri, or other major job boards.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Scrape(e) => {
                // Per-strategy reasons go to the log; the client gets the board hint.
                tracing::warn!("Scrape failed: {e}");
                (
                    StatusCode::BAD_REQUEST,
                    "SCRAPE_FAILED",
                    SCRAPE_HINT.to_string(),
                )
            }
            AppError::Extract(e @ ExtractError::UnsupportedFormat(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNSUPPORTED_FORMAT",
                e.to_string(),
            ),
            AppError::Extract(e @ ExtractError::InsufficientText) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_TEXT",
                e.to_string(),
            ),
            AppError::Extract(e) => {
                tracing::warn!("Resume extraction failed: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNREADABLE_DOCUMENT",
                    "Could not read the uploaded resume file".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
