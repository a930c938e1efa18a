//! Health check handler

use axum::{extract::State, Json};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chauffeur-fares",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": state.cache.stats(),
    }))
}
