use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::AppState;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "backoffice-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe. Ready only while the booking backend answers.
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.backend.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Booking backend not ready");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(json!({ "status": "ready" })))
}
