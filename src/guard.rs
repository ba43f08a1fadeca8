use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{pages, pages::Page, permission, route_table, session::Session};

/// RouteView
///
/// What the authenticated shell's content area shows for the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum RouteView {
    /// The wrapped page, rendered as-is.
    Page { page: Page },
    /// Fixed denial view. The location is left untouched.
    AccessDenied,
    /// No entry in the route switch matches the location.
    NotFound,
}

/// RouteGuard
///
/// Wraps one page with the permission required to see it. Rendering consults the permission
/// evaluator against the current session and either yields the page or `AccessDenied`.
/// It never redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    page: Page,
    required: Option<&'static str>,
}

impl RouteGuard {
    pub fn new(page: Page, required: Option<&'static str>) -> Self {
        Self { page, required }
    }

    pub fn render(&self, session: &Session) -> RouteView {
        if permission::is_granted(self.required, session.permissions()) {
            RouteView::Page { page: self.page }
        } else {
            RouteView::AccessDenied
        }
    }
}

/// guarded_route
///
/// Builds the guard for `location` from the route switch. The requirement comes from the
/// permission table keyed by the switch entry's pattern, so `{param}` entries carry none.
pub fn guarded_route(location: &str) -> Option<RouteGuard> {
    pages::match_route(location)
        .map(|(pattern, page)| RouteGuard::new(page, route_table::requirement_for(pattern)))
}

/// render_location
///
/// Renders the authenticated shell's content for `location`.
pub fn render_location(location: &str, session: &Session) -> RouteView {
    match guarded_route(location) {
        Some(guard) => guard.render(session),
        None => RouteView::NotFound,
    }
}
