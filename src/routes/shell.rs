use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Shell Router Module
///
/// The per-tab lifecycle of the application shell: mount, evaluate, navigate, and the
/// completion signals of the transition animation and the loader.
pub fn shell_routes() -> Router<AppState> {
    Router::new()
        // POST /tabs/{tab_id}/login-marker
        // Written by the login flow once sign-in succeeds. Rejected without a session.
        .route("/tabs/{tab_id}/login-marker", post(handlers::set_login_marker))
        // POST/DELETE /tabs/{tab_id}/mount
        // Starts or ends a page lifetime. Mounting consumes the login marker.
        .route(
            "/tabs/{tab_id}/mount",
            post(handlers::mount_shell).delete(handlers::unmount_shell),
        )
        // GET /tabs/{tab_id}/view
        .route("/tabs/{tab_id}/view", get(handlers::get_view))
        // POST /tabs/{tab_id}/navigate
        // Runs the navigation enforcer on every location change.
        .route("/tabs/{tab_id}/navigate", post(handlers::navigate))
        // Completion signals are scoped to a mount so late ones from a previous page lifetime
        // are discarded.
        .route(
            "/tabs/{tab_id}/mounts/{mount_id}/transition-complete",
            post(handlers::transition_complete),
        )
        .route(
            "/tabs/{tab_id}/mounts/{mount_id}/loading-complete",
            post(handlers::loading_complete),
        )
}
