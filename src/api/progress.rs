use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;

pub async fn get_state(State(state): State<AppState>) -> Response {
    Json(state.controller.snapshot()).into_response()
}

pub async fn get_progress(State(state): State<AppState>) -> Response {
    Json(state.controller.progress()).into_response()
}

/// Kick off a run; progress is polled through `/progress`
pub async fn start_processing(State(state): State<AppState>) -> Response {
    match state.controller.process().await {
        Ok(_handle) => {
            let progress = state.controller.progress();
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "message": "Processing started",
                    "total": progress.total
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
