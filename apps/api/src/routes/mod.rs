pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::ingest::handlers as ingest;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.request_body_limit();

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/model", get(health::model_health_handler))
        // Documents
        .route("/api/v1/documents/extract", post(ingest::handle_extract))
        // Analysis
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/analysis/report", post(analysis::handle_report))
        .route(
            "/api/v1/analysis/suggestions",
            post(analysis::handle_suggestions),
        )
        .route("/api/v1/job/analyze", post(analysis::handle_job_analyze))
        .route("/api/v1/keywords/extract", post(analysis::handle_keywords))
        // Downloads
        .route("/api/v1/tailored/download", post(analysis::handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
