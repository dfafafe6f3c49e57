use axum::{http::StatusCode, response::IntoResponse, Json};
use shared::HealthResponse;
use tracing::debug;

/// Liveness check
pub async fn health() -> impl IntoResponse {
    debug!("GET /api/health");
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
}
