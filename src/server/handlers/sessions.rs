use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::PipelineError;
use crate::session::SessionStore;
use crate::state::AppState;

pub async fn create_session(
    State(_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, PipelineError> {
    let session_id = SessionStore::generate_id();
    Ok(Json(json!({ "sessionId": session_id })))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, PipelineError> {
    let history = state.sessions.history(&session_id).await?;
    let count = history.len();
    Ok(Json(json!({
        "history": history,
        "count": count,
    })))
}

pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, PipelineError> {
    state.sessions.clear(&session_id).await?;
    Ok(Json(json!({
        "message": "Session cleared successfully",
        "sessionId": session_id,
    })))
}
