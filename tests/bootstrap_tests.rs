use console_gate::{
    Session,
    bootstrap::{BootstrapController, ShellPhase, ShellView},
    guard::RouteView,
    login_marker::{self, CAME_FROM_LOGIN, MemoryTabStorage, TabStorage},
    models::User,
    pages::Page,
    permission::PermissionSet,
};
use std::time::Duration;
use uuid::Uuid;

const LOADING_MAX: Duration = Duration::from_millis(5_000);

fn team_session() -> Session {
    Session::authenticated(User {
        id: Uuid::from_u128(1),
        email: "team@example.com".to_string(),
        permissions: Some(PermissionSet::List(vec!["team:view".to_string()])),
    })
}

// --- Login Marker ---

#[test]
fn test_marker_is_consumed_at_most_once() {
    let mut storage = MemoryTabStorage::new();
    login_marker::mark(&mut storage);

    assert!(login_marker::take(&mut storage));
    assert_eq!(storage.get(CAME_FROM_LOGIN), None);
    assert!(!login_marker::take(&mut storage));
}

#[test]
fn test_marker_only_counts_exact_true() {
    let mut storage = MemoryTabStorage::new();
    storage.set(CAME_FROM_LOGIN, "yes".to_string());

    assert!(!login_marker::take(&mut storage));
    // Cleared regardless of value.
    assert_eq!(storage.get(CAME_FROM_LOGIN), None);
}

#[test]
fn test_mount_consumes_marker_and_second_mount_skips_transition() {
    let mut storage = MemoryTabStorage::new();
    login_marker::mark(&mut storage);

    let first = BootstrapController::mount(&mut storage);
    assert_eq!(storage.get(CAME_FROM_LOGIN), None);
    assert_eq!(first.phase(&team_session()), ShellPhase::Transition);

    let second = BootstrapController::mount(&mut storage);
    assert_eq!(second.phase(&team_session()), ShellPhase::App);
}

// --- Precedence ---

#[test]
fn test_transition_preempts_loading() {
    let controller = BootstrapController::new(true);
    let session = Session::anonymous().loading(true);
    assert_eq!(controller.phase(&session), ShellPhase::Transition);
}

#[test]
fn test_transition_preempts_authenticated_app() {
    let controller = BootstrapController::new(true);
    assert_eq!(controller.phase(&team_session()), ShellPhase::Transition);
}

#[test]
fn test_transition_ends_only_on_completion_signal() {
    let mut controller = BootstrapController::new(true);
    let session = team_session().loading(true);

    // Re-evaluating any number of times does not clear the transition.
    for _ in 0..3 {
        assert_eq!(controller.phase(&session), ShellPhase::Transition);
    }

    controller.transition_complete();
    assert_eq!(controller.phase(&session), ShellPhase::Loading);
}

#[test]
fn test_loading_preempts_public_and_app() {
    let controller = BootstrapController::new(false);
    assert_eq!(
        controller.phase(&Session::anonymous().loading(true)),
        ShellPhase::Loading
    );
    assert_eq!(
        controller.phase(&team_session().loading(true)),
        ShellPhase::Loading
    );
}

#[test]
fn test_loader_completion_falls_through_even_if_still_loading() {
    let mut controller = BootstrapController::new(false);
    controller.loading_complete();

    assert_eq!(
        controller.phase(&Session::anonymous().loading(true)),
        ShellPhase::Public
    );
    assert_eq!(
        controller.phase(&team_session().loading(true)),
        ShellPhase::App
    );
}

#[test]
fn test_unauthenticated_renders_public_shell() {
    let controller = BootstrapController::new(false);
    assert_eq!(
        controller.render(&Session::anonymous(), "/campaigns", LOADING_MAX),
        ShellView::Public
    );
}

#[test]
fn test_loading_view_carries_max_duration() {
    let controller = BootstrapController::new(false);
    assert_eq!(
        controller.render(&Session::anonymous().loading(true), "/", LOADING_MAX),
        ShellView::Loading {
            max_duration_ms: 5_000
        }
    );
}

#[test]
fn test_authenticated_renders_app_with_guarded_content() {
    let controller = BootstrapController::new(false);
    let view = controller.render(&team_session(), "/team", LOADING_MAX);

    match view {
        ShellView::App { sidebar, content } => {
            assert_eq!(content, RouteView::Page { page: Page::Team });
            assert!(sidebar.iter().any(|link| link.path == "/team"));
            assert!(!sidebar.iter().any(|link| link.path == "/campaigns"));
        }
        other => panic!("expected app shell, got {:?}", other),
    }
}

#[test]
fn test_every_session_maps_to_exactly_one_phase() {
    for came_from_login in [false, true] {
        for is_loading in [false, true] {
            for is_authenticated in [false, true] {
                let controller = BootstrapController::new(came_from_login);
                let session = Session {
                    is_authenticated,
                    is_loading,
                    user: None,
                };
                let expected = if came_from_login {
                    ShellPhase::Transition
                } else if is_loading {
                    ShellPhase::Loading
                } else if !is_authenticated {
                    ShellPhase::Public
                } else {
                    ShellPhase::App
                };
                let view = controller.render(&session, "/dashboard", LOADING_MAX);
                assert_eq!(controller.phase(&session), expected);
                assert_eq!(view.phase(), expected);
            }
        }
    }
}
