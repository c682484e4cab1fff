//! Router assembly and the health endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::ws::ws_handler;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
    pub synthetic: bool,
    pub viewers: usize,
    pub frames: usize,
}

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/stream", get(ws_handler))
        .route("/", get(ws_handler))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: state.config().mode.as_str(),
        synthetic: state.is_synthetic(),
        viewers: state.viewer_count(),
        frames: state.frame_count(),
    })
}
