pub mod health;
pub mod metrics;
pub mod submit;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// API routes that share the application state. The Prometheus endpoint is
/// attached separately by the binary since it carries its own state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/analyze", post(submit::analyze_problem_image))
        .route("/api/v1/requests", post(submit::submit_maintenance_request))
        .route("/api/v1/workers", post(submit::register_worker))
        .with_state(state)
}
