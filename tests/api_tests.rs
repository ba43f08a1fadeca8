use console_gate::{
    AppConfig, AppState, MemoryUserDirectory,
    bootstrap::ShellView,
    create_router,
    guard::RouteView,
    models::{AccessResponse, ShellResponse, SidebarResponse, User},
    pages::Page,
    permission::PermissionSet,
};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

const TEAM_USER: Uuid = Uuid::from_u128(0x7EA);

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    // Requests as the team-only user via the local bypass header.
    fn as_team(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("x-user-id", TEAM_USER.to_string())
    }
}

async fn spawn_app() -> TestApp {
    let directory = MemoryUserDirectory::new().with_user(User {
        id: TEAM_USER,
        email: "team@example.com".to_string(),
        permissions: Some(PermissionSet::List(vec!["team:view".to_string()])),
    });
    // Default config is Env::Local, so the x-user-id bypass is active.
    let state = AppState::new(Arc::new(directory), AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_anonymous_mount_renders_public_shell() {
    let app = spawn_app().await;
    let tab = Uuid::new_v4();

    let response = app
        .client
        .post(app.url(&format!("/tabs/{}/mount", tab)))
        .json(&json!({ "path": "/campaigns" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let shell: ShellResponse = response.json().await.unwrap();
    assert_eq!(shell.view, ShellView::Public);
    assert_eq!(shell.redirect_to, None);
}

#[tokio::test]
async fn test_login_marker_then_transition_then_app() {
    let app = spawn_app().await;
    let tab = Uuid::new_v4();

    let marked = app
        .as_team(app.client.post(app.url(&format!("/tabs/{}/login-marker", tab))))
        .send()
        .await
        .unwrap();
    assert_eq!(marked.status(), StatusCode::NO_CONTENT);

    // Still loading and just logged in: the transition wins.
    let mounted: ShellResponse = app
        .as_team(app.client.post(app.url(&format!("/tabs/{}/mount", tab))))
        .header("x-session-loading", "true")
        .json(&json!({ "path": "/team" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mounted.view, ShellView::Transition);

    let done: ShellResponse = app
        .as_team(app.client.post(app.url(&format!(
            "/tabs/{}/mounts/{}/transition-complete",
            tab, mounted.mount_id
        ))))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    match done.view {
        ShellView::App { content, .. } => assert_eq!(
            content,
            RouteView::Page {
                page: Page::Team
            }
        ),
        other => panic!("expected app shell, got {:?}", other),
    }

    // A late callback for a mount that no longer exists is discarded.
    let stale = app
        .as_team(app.client.post(app.url(&format!(
            "/tabs/{}/mounts/{}/transition-complete",
            tab,
            Uuid::new_v4()
        ))))
        .send()
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_login_marker_requires_signed_in_session() {
    let app = spawn_app().await;
    let tab = Uuid::new_v4();

    let rejected = app
        .client
        .post(app.url(&format!("/tabs/{}/login-marker", tab)))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    // Nothing was stored, so the signed-in mount skips the transition.
    let mounted: ShellResponse = app
        .as_team(app.client.post(app.url(&format!("/tabs/{}/mount", tab))))
        .json(&json!({ "path": "/team" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(matches!(mounted.view, ShellView::App { .. }));
}

#[tokio::test]
async fn test_forbidden_navigation_is_denied_and_redirected() {
    let app = spawn_app().await;
    let tab = Uuid::new_v4();

    app.as_team(app.client.post(app.url(&format!("/tabs/{}/mount", tab))))
        .json(&json!({ "path": "/team" }))
        .send()
        .await
        .unwrap();

    let denied: ShellResponse = app
        .as_team(app.client.post(app.url(&format!("/tabs/{}/navigate", tab))))
        .json(&json!({ "path": "/campaigns" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(denied.redirect_to.as_deref(), Some("/dashboard"));
    match denied.view {
        ShellView::App { content, .. } => assert_eq!(content, RouteView::AccessDenied),
        other => panic!("expected app shell, got {:?}", other),
    }

    let landed: ShellResponse = app
        .as_team(app.client.post(app.url(&format!("/tabs/{}/navigate", tab))))
        .json(&json!({ "path": "/dashboard" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(landed.redirect_to, None);
    assert_eq!(landed.location, "/dashboard");
}

#[tokio::test]
async fn test_view_without_mount_is_not_found() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url(&format!("/tabs/{}/view", Uuid::new_v4())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_access_queries() {
    let app = spawn_app().await;

    let permission: AccessResponse = app
        .as_team(app.client.get(app.url("/access/permission")))
        .query(&[("key", "team.view")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(permission.granted);

    let route: AccessResponse = app
        .as_team(app.client.get(app.url("/access/route")))
        .query(&[("path", "/campaigns")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!route.granted);

    let sidebar: SidebarResponse = app
        .as_team(app.client.get(app.url("/access/sidebar")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let paths: Vec<_> = sidebar.links.iter().map(|l| l.path.as_str()).collect();
    assert_eq!(paths, vec!["/dashboard", "/team"]);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: serde_json::Value = response.json().await.unwrap();
    assert!(doc["paths"]["/tabs/{tab_id}/navigate"].is_object());
}
