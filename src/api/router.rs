//! Router construction for the annotation server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::engine::AnnotationEngine;

/// Delta batches from the notifier can be very large.
pub const DELTA_BODY_LIMIT: usize = 500 * 1024 * 1024;

/// Build the full axum router with all routes and middleware.
pub fn build_router(engine: AnnotationEngine) -> Router {
    Router::new()
        .route(
            "/delta",
            post(handlers::delta).layer(DefaultBodyLimit::max(DELTA_BODY_LIMIT)),
        )
        .route("/update-all", post(handlers::update_all))
        .route("/clear", post(handlers::clear))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
