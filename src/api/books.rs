use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;
use crate::services::book_service;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub branch: Option<String>,
}

pub async fn list_books(State(state): State<AppState>) -> Response {
    match book_service::list_books(state.book_repo.as_ref()).await {
        Ok(books) => Json(json!({
            "books": books,
            "total": books.len()
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// `?branch=` selects that branch before checking
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Response {
    if let Some(branch) = query.branch.as_deref()
        && let Err(e) = state.controller.select_branch(branch)
    {
        return error_response(&e);
    }

    match state.controller.check_availability().await {
        Ok(books) => Json(json!({
            "branch": state.controller.snapshot().selected_branch,
            "books": books,
            "total": books.len()
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}
