use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    bootstrap::ShellView,
    pages::NavLink,
    permission::{self, PermissionSet},
    tabs::TabView,
};

// --- Core Identity ---

/// User
///
/// The identity the session provider resolves for a tab, as stored in `public.profiles`.
/// `permissions` keeps whatever shape the profile holds (list or map); a malformed value
/// is read as `None`, i.e. zero permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default, deserialize_with = "permission::deserialize_lenient")]
    pub permissions: Option<PermissionSet>,
}

// --- Request Payloads ---

/// MountRequest
///
/// Input for POST /tabs/{tab_id}/mount: the location the page loaded at.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MountRequest {
    pub path: String,
}

/// NavigateRequest
///
/// Input for POST /tabs/{tab_id}/navigate: the location the tab just moved to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    pub path: String,
}

/// PermissionQuery
///
/// Query parameters for GET /access/permission.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PermissionQuery {
    /// Permission key in dot or colon form, e.g. `contacts.view`.
    pub key: String,
}

/// RouteQuery
///
/// Query parameters for GET /access/route.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RouteQuery {
    /// Console path, e.g. `/campaigns`.
    pub path: String,
}

// --- Response Payloads ---

/// ShellResponse
///
/// A tab's shell after an evaluation: its mount, its current location and the rendered view.
/// After a forced redirect `view` still shows what rendered at the requested path (access
/// denied), `location` is already the landing route, and `redirect_to` tells the tab to
/// replace its history entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShellResponse {
    pub mount_id: Uuid,
    pub location: String,
    pub view: ShellView,
    pub redirect_to: Option<String>,
}

impl From<TabView> for ShellResponse {
    fn from(tab: TabView) -> Self {
        ShellResponse {
            mount_id: tab.mount_id,
            location: tab.location,
            view: tab.view,
            redirect_to: tab.redirect_to,
        }
    }
}

/// AccessResponse
///
/// Answer to a single permission or route query.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AccessResponse {
    pub subject: String,
    pub granted: bool,
}

/// SidebarResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SidebarResponse {
    pub links: Vec<NavLink>,
}
