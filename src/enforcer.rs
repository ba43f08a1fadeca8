use crate::{models::User, permission, route_table, session::Session};

/// Redirect
///
/// A forced navigation away from `from` to `to`, replacing the current history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: String,
    pub to: String,
}

type EffectKey = (String, bool, Option<User>);

/// NavigationEnforcer
///
/// Keeps an authenticated session's location off routes it is not entitled to. Complements
/// the route guard: the guard stops a forbidden page from rendering, this stops the location
/// from staying on a forbidden path (deep links, back/forward).
///
/// Evaluation is keyed on `(location, is_authenticated, user)` and runs only when that key
/// changes. A redirect moves the key to the landing route, so coming back to the same
/// forbidden location is a change and is enforced again.
#[derive(Debug, Clone)]
pub struct NavigationEnforcer {
    landing_route: String,
    last_key: Option<EffectKey>,
}

impl NavigationEnforcer {
    pub fn new(landing_route: impl Into<String>) -> Self {
        Self {
            landing_route: landing_route.into(),
            last_key: None,
        }
    }

    pub fn landing_route(&self) -> &str {
        &self.landing_route
    }

    /// on_change
    ///
    /// Re-evaluates if the key differs from the last evaluation; otherwise does nothing.
    pub fn on_change(&mut self, location: &str, session: &Session) -> Option<Redirect> {
        let key = (
            location.to_string(),
            session.is_authenticated,
            session.user.clone(),
        );
        if self.last_key.as_ref() == Some(&key) {
            return None;
        }
        let redirect = self.evaluate(location, session);
        self.last_key = match &redirect {
            Some(redirect) => Some((redirect.to.clone(), key.1, key.2)),
            None => Some(key),
        };
        redirect
    }

    /// evaluate
    ///
    /// The enforcement rule itself, without change detection. Decides on the pathname, so a
    /// query string, fragment or trailing slash does not get a forbidden route past it.
    pub fn evaluate(&self, location: &str, session: &Session) -> Option<Redirect> {
        let path = route_table::pathname(location);
        // The landing route is never redirected away from, even if configured to a gated path.
        if !session.is_authenticated || path == "/" || path == self.landing_route {
            return None;
        }

        let required = route_table::requirement_for(path)?;
        if permission::is_granted(Some(required), session.permissions()) {
            return None;
        }

        Some(Redirect {
            from: location.to_string(),
            to: self.landing_route.clone(),
        })
    }
}
