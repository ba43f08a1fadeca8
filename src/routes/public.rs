use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints callable without any session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
}
