use crate::{
    AppState,
    models::{
        AccessResponse, MountRequest, NavigateRequest, PermissionQuery, RouteQuery,
        ShellResponse, SidebarResponse,
    },
    pages,
    session::Session,
    tabs::TabError,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

impl From<TabError> for StatusCode {
    fn from(err: TabError) -> Self {
        match err {
            TabError::UnknownTab | TabError::NotMounted => StatusCode::NOT_FOUND,
            // Callbacks for a replaced or unmounted shell are discarded.
            TabError::StaleMount => StatusCode::GONE,
        }
    }
}

// --- Shell Handlers ---

/// set_login_marker
///
/// [Shell Route] Called by the login flow right after sign-in succeeds, before it navigates
/// into the console. The next mount in this tab plays the post-login transition, exactly once.
/// Only a signed-in caller may create tab state this way.
#[utoipa::path(
    post,
    path = "/tabs/{tab_id}/login-marker",
    params(("tab_id" = Uuid, Path, description = "Client-generated tab id")),
    responses(
        (status = 204, description = "Marker stored"),
        (status = 401, description = "No signed-in session")
    )
)]
pub async fn set_login_marker(
    session: Session,
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
) -> StatusCode {
    if !session.is_authenticated {
        tracing::warn!(tab_id = %tab_id, "Login marker rejected: no signed-in session");
        return StatusCode::UNAUTHORIZED;
    }
    state.tabs.mark_login(tab_id);
    StatusCode::NO_CONTENT
}

/// mount_shell
///
/// [Shell Route] Starts a new page lifetime for the tab. Consumes the login marker before the
/// first decision, then renders the shell at the load location.
#[utoipa::path(
    post,
    path = "/tabs/{tab_id}/mount",
    params(("tab_id" = Uuid, Path, description = "Client-generated tab id")),
    request_body = MountRequest,
    responses((status = 200, description = "Mounted", body = ShellResponse))
)]
pub async fn mount_shell(
    session: Session,
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
    Json(payload): Json<MountRequest>,
) -> Json<ShellResponse> {
    let tab = state.tabs.mount(tab_id, &payload.path, &session);
    log_redirect(tab_id, &payload.path, tab.redirect_to.as_deref());
    Json(tab.into())
}

/// unmount_shell
///
/// [Shell Route] Ends the tab's current page lifetime and cancels its pending timers.
#[utoipa::path(
    delete,
    path = "/tabs/{tab_id}/mount",
    params(("tab_id" = Uuid, Path, description = "Client-generated tab id")),
    responses(
        (status = 204, description = "Unmounted"),
        (status = 404, description = "Nothing mounted")
    )
)]
pub async fn unmount_shell(State(state): State<AppState>, Path(tab_id): Path<Uuid>) -> StatusCode {
    if state.tabs.unmount(tab_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_view
///
/// [Shell Route] Re-evaluates the shell at the tab's current location.
#[utoipa::path(
    get,
    path = "/tabs/{tab_id}/view",
    params(("tab_id" = Uuid, Path, description = "Client-generated tab id")),
    responses(
        (status = 200, description = "Current view", body = ShellResponse),
        (status = 404, description = "Nothing mounted")
    )
)]
pub async fn get_view(
    session: Session,
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
) -> Result<Json<ShellResponse>, StatusCode> {
    let tab = state.tabs.view(tab_id, &session)?;
    Ok(Json(tab.into()))
}

/// navigate
///
/// [Shell Route] Records a location change and runs the navigation enforcer.
/// A forbidden gated path comes back with `redirect_to` set to the landing route.
#[utoipa::path(
    post,
    path = "/tabs/{tab_id}/navigate",
    params(("tab_id" = Uuid, Path, description = "Client-generated tab id")),
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "View at the new location", body = ShellResponse),
        (status = 404, description = "Nothing mounted")
    )
)]
pub async fn navigate(
    session: Session,
    State(state): State<AppState>,
    Path(tab_id): Path<Uuid>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<ShellResponse>, StatusCode> {
    let tab = state.tabs.navigate(tab_id, &payload.path, &session)?;
    log_redirect(tab_id, &payload.path, tab.redirect_to.as_deref());
    Ok(Json(tab.into()))
}

/// transition_complete
///
/// [Shell Route] The post-login animation finished. Ignored (410) if `mount_id` is no longer
/// the tab's current mount.
#[utoipa::path(
    post,
    path = "/tabs/{tab_id}/mounts/{mount_id}/transition-complete",
    params(
        ("tab_id" = Uuid, Path, description = "Client-generated tab id"),
        ("mount_id" = Uuid, Path, description = "Mount the animation belongs to")
    ),
    responses(
        (status = 200, description = "View after the transition", body = ShellResponse),
        (status = 404, description = "Unknown tab"),
        (status = 410, description = "Stale mount")
    )
)]
pub async fn transition_complete(
    session: Session,
    State(state): State<AppState>,
    Path((tab_id, mount_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ShellResponse>, StatusCode> {
    let tab = state.tabs.transition_complete(tab_id, mount_id, &session)?;
    Ok(Json(tab.into()))
}

/// loading_complete
///
/// [Shell Route] The loader reported completion. Ignored (410) for stale mounts.
#[utoipa::path(
    post,
    path = "/tabs/{tab_id}/mounts/{mount_id}/loading-complete",
    params(
        ("tab_id" = Uuid, Path, description = "Client-generated tab id"),
        ("mount_id" = Uuid, Path, description = "Mount the loader belongs to")
    ),
    responses(
        (status = 200, description = "View after the loader", body = ShellResponse),
        (status = 404, description = "Unknown tab"),
        (status = 410, description = "Stale mount")
    )
)]
pub async fn loading_complete(
    session: Session,
    State(state): State<AppState>,
    Path((tab_id, mount_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ShellResponse>, StatusCode> {
    let tab = state.tabs.loading_complete(tab_id, mount_id, &session)?;
    Ok(Json(tab.into()))
}

// --- Access Query Handlers ---

/// has_permission
///
/// [Access Route] Whether the session holds `key` (dot or colon form).
#[utoipa::path(
    get,
    path = "/access/permission",
    params(PermissionQuery),
    responses((status = 200, description = "Permission check", body = AccessResponse))
)]
pub async fn has_permission(
    session: Session,
    Query(query): Query<PermissionQuery>,
) -> Json<AccessResponse> {
    let granted = session.access().has_permission(&query.key);
    Json(AccessResponse {
        subject: query.key,
        granted,
    })
}

/// can_access_route
///
/// [Access Route] Whether the session may view `path`. Unknown paths are unguarded.
#[utoipa::path(
    get,
    path = "/access/route",
    params(RouteQuery),
    responses((status = 200, description = "Route check", body = AccessResponse))
)]
pub async fn can_access_route(
    session: Session,
    Query(query): Query<RouteQuery>,
) -> Json<AccessResponse> {
    let granted = session.access().can_access_route(&query.path);
    Json(AccessResponse {
        subject: query.path,
        granted,
    })
}

/// get_sidebar
///
/// [Access Route] The sidebar links the session may follow.
#[utoipa::path(
    get,
    path = "/access/sidebar",
    responses((status = 200, description = "Visible sidebar links", body = SidebarResponse))
)]
pub async fn get_sidebar(session: Session) -> Json<SidebarResponse> {
    Json(SidebarResponse {
        links: pages::sidebar(&session.access()),
    })
}

fn log_redirect(tab_id: Uuid, from: &str, to: Option<&str>) {
    if let Some(to) = to {
        tracing::info!(tab_id = %tab_id, from = %from, to = %to, "Enforced redirect off forbidden route");
    }
}
