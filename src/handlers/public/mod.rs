use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::processing::templates;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Focus API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Tasks, pomodoro sessions, versioned notes and AI note processing",
        "endpoints": {
            "public": "/, /health, /prompts/templates/types",
            "tasks": "/tasks[/:id] (protected)",
            "pomodoro": "/pomodoro-sessions[/:id] (protected)",
            "notes": "/note-versions[/:id] (protected)",
            "prompts": "/prompts[/:id] (protected)",
            "processing": "/process-note, /process-note-stream (protected)",
        }
    }))
}

/// GET /health - storage reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

/// GET /prompts/templates/types - built-in template catalog
pub async fn template_types() -> Json<Value> {
    Json(templates::catalog())
}
