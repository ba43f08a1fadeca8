use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Decision logic: pure, synchronous, no I/O.
pub mod access;
pub mod bootstrap;
pub mod enforcer;
pub mod guard;
pub mod login_marker;
pub mod pages;
pub mod permission;
pub mod route_table;
pub mod session;

// Service plumbing around the decision logic.
pub mod auth;
pub mod config;
pub mod directory;
pub mod handlers;
pub mod models;
pub mod tabs;

pub mod routes;
use routes::{access as access_router, public, shell};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use directory::{DirectoryState, MemoryUserDirectory, PostgresUserDirectory};
pub use session::Session;
pub use tabs::{TabRegistry, TabRegistryState};

/// ApiDoc
///
/// OpenAPI document for the gate, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::set_login_marker, handlers::mount_shell, handlers::unmount_shell,
        handlers::get_view, handlers::navigate, handlers::transition_complete,
        handlers::loading_complete, handlers::has_permission, handlers::can_access_route,
        handlers::get_sidebar
    ),
    components(
        schemas(
            models::ShellResponse, models::MountRequest, models::NavigateRequest,
            models::AccessResponse, models::SidebarResponse, bootstrap::ShellView,
            bootstrap::ShellPhase, guard::RouteView, pages::Page, pages::NavLink,
        )
    ),
    tags(
        (name = "console-gate", description = "Route authorization and session bootstrap for the console")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared state for every request: the user directory backing session resolution, the per-tab
/// registry, and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryState,
    pub tabs: TabRegistryState,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state with a fresh tab registry configured from `config`.
    pub fn new(directory: DirectoryState, config: AppConfig) -> Self {
        let tabs = std::sync::Arc::new(TabRegistry::new(
            config.landing_route.clone(),
            config.loading_max,
        ));
        Self {
            directory,
            tabs,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for TabRegistryState {
    fn from_ref(app_state: &AppState) -> TabRegistryState {
        app_state.tabs.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, the observability layers and the shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(shell::shell_routes())
        .merge(access_router::access_routes())
        .with_state(state);

    // Request ids are generated first so the trace span can record them, then echoed back.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` of the request.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
