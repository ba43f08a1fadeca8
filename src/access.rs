use crate::{permission, permission::PermissionSet, route_table};

/// AccessQuery
///
/// Read-only permission questions for navigation UI, e.g. deciding which sidebar links to show.
/// Borrowed from a `Session` via `Session::access`.
#[derive(Debug, Clone, Copy)]
pub struct AccessQuery<'a> {
    held: Option<&'a PermissionSet>,
}

impl<'a> AccessQuery<'a> {
    pub fn new(held: Option<&'a PermissionSet>) -> Self {
        Self { held }
    }

    pub fn has_permission(&self, key: &str) -> bool {
        permission::is_granted(Some(key), self.held)
    }

    /// True when the route is unguarded or the session holds its required permission.
    pub fn can_access_route(&self, path: &str) -> bool {
        let required = route_table::requirement_for(route_table::pathname(path));
        permission::is_granted(required, self.held)
    }
}
