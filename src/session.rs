use crate::{access::AccessQuery, models::User, permission::PermissionSet};

/// Session
///
/// What the session provider reports about the visiting tab at the moment of evaluation.
/// The gate only reads this; it never mutates the provider's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// The provider has resolved a valid identity.
    pub is_authenticated: bool,
    /// The provider's asynchronous auth check is still in flight.
    pub is_loading: bool,
    /// The resolved user, if any.
    pub user: Option<User>,
}

impl Session {
    /// An unauthenticated, settled session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            is_authenticated: true,
            is_loading: false,
            user: Some(user),
        }
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    /// The held-permission set, if the session has a user that carries one.
    pub fn permissions(&self) -> Option<&PermissionSet> {
        self.user.as_ref().and_then(|user| user.permissions.as_ref())
    }

    pub fn access(&self) -> AccessQuery<'_> {
        AccessQuery::new(self.permissions())
    }
}
