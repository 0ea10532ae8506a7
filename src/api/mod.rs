use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/sample", get(handlers::get_sample))
        .route("/api/validate", post(handlers::post_validate))
        .route("/api/analytics", post(handlers::post_analytics))
        .route("/api/heatmap", post(handlers::post_heatmap))
        .route("/api/forecast", post(handlers::post_forecast))
        .route("/api/recommendations", post(handlers::post_recommendations))
        .route("/api/report", post(handlers::post_report))
        .with_state(state)
}
