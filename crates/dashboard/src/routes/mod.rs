//! HTTP routes

pub mod health;
pub mod layout;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (no tenant resolution, for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Every other path is a dashboard page; the layout is resolved for its URL
    let layout_routes = Router::new()
        .route("/api/v1/layout", get(layout::get_layout))
        .fallback(layout::get_layout)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            layout::load_layout,
        ));

    Router::new()
        .merge(health_routes)
        .merge(layout_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
