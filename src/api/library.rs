use axum::{extract::State, response::IntoResponse, response::Response, Json};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct SelectBranchRequest {
    pub branch_code: String,
}

pub async fn list_branches(State(state): State<AppState>) -> Response {
    match state.controller.load_branches().await {
        Ok(branches) => Json(json!({
            "branches": branches,
            "total": branches.len()
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn update_branches(State(state): State<AppState>) -> Response {
    match state.controller.update_branches().await {
        Ok(branches) => Json(json!({
            "message": "Branches updated",
            "branches": branches,
            "total": branches.len()
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn select_branch(
    State(state): State<AppState>,
    Json(req): Json<SelectBranchRequest>,
) -> Response {
    match state.controller.select_branch(&req.branch_code) {
        Ok(()) => Json(json!({ "selected_branch": req.branch_code.trim() })).into_response(),
        Err(e) => error_response(&e),
    }
}
