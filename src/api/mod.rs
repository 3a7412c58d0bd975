pub mod books;
pub mod data;
pub mod health;
pub mod library;
pub mod progress;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::ControllerError;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Controller state
        .route("/state", get(progress::get_state))
        .route("/progress", get(progress::get_progress))
        .route("/process", post(progress::start_processing))
        // Branches
        .route("/branches", get(library::list_branches))
        .route("/branches/update", post(library::update_branches))
        .route("/branches/select", post(library::select_branch))
        // Books
        .route("/import/file", post(data::import_file))
        .route("/books", get(books::list_books))
        .route("/availability", get(books::check_availability))
        .with_state(state)
}

pub(crate) fn error_response(error: &ControllerError) -> Response {
    let status = match error {
        ControllerError::NoFileSelected
        | ControllerError::NoBranchSelected
        | ControllerError::Import(_)
        | ControllerError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        ControllerError::AlreadyRunning => StatusCode::CONFLICT,
        ControllerError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        ControllerError::Domain(DomainError::External(_)) => StatusCode::BAD_GATEWAY,
        ControllerError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
