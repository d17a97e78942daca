pub mod config;
pub mod observability;
pub mod protocol;
pub mod session;
pub mod state;
pub mod ws;

use std::path::PathBuf;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use state::RelayState;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
    pub intents: usize,
}

async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active_sessions: state.connections.len(),
        intents: state.responses.len(),
    })
}

/// Build the relay router.
///
/// - `GET /health` — liveness plus session / intent counts
/// - `GET /ws` — chat websocket
/// - anything else — static chat UI from `static_dir`, when given
pub fn app(state: RelayState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
