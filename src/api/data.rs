use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error_response;
use crate::infrastructure::AppState;

/// Multipart upload of a Goodreads export in the `file` field
pub async fn import_file(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed multipart upload: {}", e);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Malformed upload: {}", e) })),
                )
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Failed to read upload: {}", e) })),
                )
                    .into_response();
            }
        };

        return match state.controller.select_file(&name, &data) {
            Ok(count) => Json(json!({
                "file": name,
                "books": count
            }))
            .into_response(),
            Err(e) => error_response(&e),
        };
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file uploaded" })),
    )
        .into_response()
}
