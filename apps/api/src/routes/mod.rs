pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job-matching API
        .route(
            "/api/v1/job-matching/analyze",
            post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/job-matching/analyze-with-upload",
            post(handlers::handle_analyze_with_upload),
        )
        .route(
            "/api/v1/job-matching/history",
            get(handlers::handle_history),
        )
        .route(
            "/api/v1/job-matching/:id",
            get(handlers::handle_get_analysis).delete(handlers::handle_delete_analysis),
        )
        .with_state(state)
}
