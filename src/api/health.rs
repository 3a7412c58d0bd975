use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::infrastructure::AppState;

/// Liveness plus a database round trip. Answers 503 when SQLite is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, database) = match state.db().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "service": "book-hound",
            "database": database,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
