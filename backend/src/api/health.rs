//! Health check endpoint

use crate::state::AppState;
use crate::status::ServiceState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Body of `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Current lifecycle phase
    pub lifecycle: ServiceState,
}

/// GET /api/health - Liveness plus lifecycle phase
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        lifecycle: state.lifecycle.current().await,
    })
}
