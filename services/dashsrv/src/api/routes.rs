//! Route definitions

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use crate::app_state::AppState;

/// Create all service routes, nested under `/utils`
pub fn create_routes(state: Arc<AppState>) -> Router {
    let utils = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/simulator/alert/{fid}/{lid}/{mid}",
            post(handlers::simulator_alert),
        )
        .route("/resetAll", post(handlers::reset_all))
        .route("/reset/{fid}", post(handlers::reset_facility))
        .route("/summaries", get(handlers::summaries));

    Router::new()
        .nest("/utils", utils)
        .layer(axum::middleware::from_fn(
            common::logging::http_request_logger,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
