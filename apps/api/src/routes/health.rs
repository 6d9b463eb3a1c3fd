use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus which evaluator backend is active.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let mut body = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "evaluator": state.evaluator.backend(),
    });

    if state.config.ai.enabled {
        body["ai"] = json!({
            "provider": state.config.ai.provider.as_str(),
            "model": state.config.ai.model,
            "configuredKeys": state.config.ai.api_keys.len(),
        });
    }

    Json(body)
}
