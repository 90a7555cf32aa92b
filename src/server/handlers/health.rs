use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "News RAG API",
        "endpoints": {
            "health": "GET /api/health",
            "newSession": "POST /api/session/new",
            "chat": "POST /api/chat",
            "history": "GET /api/session/:sessionId/history",
            "clearSession": "DELETE /api/session/:sessionId",
        }
    }))
}

/// Liveness probe. A degraded session store is reported, never a 5xx.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_healthy = state.sessions.check_liveness().await;
    let articles = state.search.count().await.ok();

    Json(json!({
        "status": if store_healthy { "healthy" } else { "degraded" },
        "sessionStore": if store_healthy { "connected" } else { "disconnected" },
        "indexedArticles": articles,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
