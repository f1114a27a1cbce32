use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Read-more content service is running",
        "index": state.index.name(),
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("READMORE_BUILD_TIME"),
    }))
}
