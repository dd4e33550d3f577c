//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::UnitOfWork;
use serde::Serialize;

use super::reservations::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Number of tables in the configured floor plan.
    pub tables: usize,
    pub confirmation_policy: &'static str,
}

/// GET /health — liveness plus the floor plan and policy the server runs with.
pub async fn check<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        tables: state.floor_plan.len(),
        confirmation_policy: state.reservation_service.policy().as_str(),
    })
}
