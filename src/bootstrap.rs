use serde::{Deserialize, Serialize};
use std::time::Duration;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    guard::{self, RouteView},
    login_marker::{self, TabStorage},
    pages::{self, NavLink},
    session::Session,
};

/// ShellPhase
///
/// The four top-level states of the application shell, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ShellPhase {
    Transition,
    Loading,
    Public,
    App,
}

/// ShellView
///
/// The fully resolved top-level view for one evaluation of the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "phase", rename_all = "snake_case")]
#[ts(export)]
pub enum ShellView {
    /// Full-screen post-login animation. Ends only on its completion signal.
    Transition,
    /// Full-screen loader, shown for at most `max_duration_ms`.
    Loading { max_duration_ms: u32 },
    /// Public site: header, the catch-all landing view, footer.
    Public,
    /// Authenticated shell: sidebar plus the guarded content for the current location.
    App {
        sidebar: Vec<NavLink>,
        content: RouteView,
    },
}

impl ShellView {
    pub fn phase(&self) -> ShellPhase {
        match self {
            ShellView::Transition => ShellPhase::Transition,
            ShellView::Loading { .. } => ShellPhase::Loading,
            ShellView::Public => ShellPhase::Public,
            ShellView::App { .. } => ShellPhase::App,
        }
    }
}

/// BootstrapController
///
/// Decides, on every evaluation, which of the four shell phases to show. One controller lives
/// for exactly one mount of the shell.
///
/// Precedence, highest first:
/// 1. `Transition` while the login marker was present at mount and the animation has not finished.
/// 2. `Loading` while the provider is loading and the loader has not finished.
/// 3. `Public` while unauthenticated.
/// 4. `App` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapController {
    show_transition: bool,
    loader_done: bool,
}

impl BootstrapController {
    /// mount
    ///
    /// Starts a new page lifetime. The login marker is consumed here, synchronously, before any
    /// decision is made, so a later mount in the same tab cannot replay the transition.
    pub fn mount(storage: &mut impl TabStorage) -> Self {
        Self::new(login_marker::take(storage))
    }

    pub fn new(came_from_login: bool) -> Self {
        Self {
            show_transition: came_from_login,
            loader_done: false,
        }
    }

    pub fn phase(&self, session: &Session) -> ShellPhase {
        if self.show_transition {
            ShellPhase::Transition
        } else if session.is_loading && !self.loader_done {
            ShellPhase::Loading
        } else if !session.is_authenticated {
            ShellPhase::Public
        } else {
            ShellPhase::App
        }
    }

    /// render
    ///
    /// Resolves the phase into a full view. `location` only matters in the `App` phase.
    pub fn render(&self, session: &Session, location: &str, loading_max: Duration) -> ShellView {
        match self.phase(session) {
            ShellPhase::Transition => ShellView::Transition,
            ShellPhase::Loading => ShellView::Loading {
                max_duration_ms: u32::try_from(loading_max.as_millis()).unwrap_or(u32::MAX),
            },
            ShellPhase::Public => ShellView::Public,
            ShellPhase::App => {
                let access = session.access();
                ShellView::App {
                    sidebar: pages::sidebar(&access),
                    content: guard::render_location(location, session),
                }
            }
        }
    }

    /// The animation signalled completion. The only way out of `Transition`.
    pub fn transition_complete(&mut self) {
        self.show_transition = false;
    }

    /// The loader finished, either by its own callback or by the fallback timer.
    /// The loader does not reappear for the rest of this mount.
    pub fn loading_complete(&mut self) {
        self.loader_done = true;
    }

    pub fn is_transitioning(&self) -> bool {
        self.show_transition
    }

    pub fn is_loader_done(&self) -> bool {
        self.loader_done
    }
}
