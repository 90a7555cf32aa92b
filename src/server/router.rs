use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health, sessions};
use crate::state::AppState;

/// Build the application router: API index, health probe, chat pipeline and
/// session management, with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/api/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/session/new", post(sessions::create_session))
        .route(
            "/api/session/:session_id/history",
            get(sessions::get_history),
        )
        .route("/api/session/:session_id", delete(sessions::clear_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
