use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::AppState;

const SERVICE_NAME: &str = "Admin Statistics API";

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Utc::now();

    if state.stats.store_healthy().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": SERVICE_NAME,
                "timestamp": timestamp,
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": SERVICE_NAME,
                "timestamp": timestamp,
                "db": "disconnected",
            })),
        )
    }
}
