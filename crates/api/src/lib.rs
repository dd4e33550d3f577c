//! HTTP API server with observability for the table reservation service.
//!
//! Provides REST endpoints for creating reservations and driving their
//! lifecycle, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{ReservationService, UnitOfWork};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::reservations::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U: UnitOfWork + 'static>(
    state: Arc<AppState<U>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<U>))
        .route("/reservations", post(routes::reservations::create::<U>))
        .route("/reservations/{id}", get(routes::reservations::get::<U>))
        .route(
            "/reservations/{id}/confirm",
            post(routes::reservations::confirm::<U>),
        )
        .route(
            "/reservations/{id}/cancel",
            post(routes::reservations::cancel::<U>),
        )
        .route(
            "/reservations/{id}/complete",
            post(routes::reservations::complete::<U>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a unit of work.
pub fn create_default_state<U: UnitOfWork>(uow: U, config: &Config) -> Arc<AppState<U>> {
    let reservation_service =
        ReservationService::new(uow).with_policy(config.confirmation_policy);

    Arc::new(AppState {
        reservation_service,
        floor_plan: config.floor_plan.clone(),
    })
}
