use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Access Router Module
///
/// Read-only permission questions, used by the frontend to hide navigation the session
/// cannot follow. Anonymous sessions get answers too: gated routes are simply denied.
pub fn access_routes() -> Router<AppState> {
    Router::new()
        .route("/access/permission", get(handlers::has_permission))
        .route("/access/route", get(handlers::can_access_route))
        .route("/access/sidebar", get(handlers::get_sidebar))
}
