use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::llm_client::{check_model, DEFAULT_MODEL};
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api"
    }))
}

/// GET /health/model
/// Round-trips a short prompt to the configured model. 503 when it fails.
pub async fn model_health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let model = state.config.llm_model.as_deref().unwrap_or(DEFAULT_MODEL);
    match check_model(state.model.as_ref()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "model": model,
                "model_reachable": true
            })),
        ),
        Err(e) => {
            warn!("Model health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "model": model,
                    "model_reachable": false,
                    "error": e.to_string()
                })),
            )
        }
    }
}
