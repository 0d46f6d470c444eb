use tracing::debug;

use crate::{Navigator, Role, Route, SessionState, UserId};

/// The role dashboard an authenticated user on `path` should be sent to.
///
/// Only generic entry points (`/` and `/dashboard`) redirect, and only for
/// a fully authenticated session. An admin on `/dashboard` is sent on to
/// `/dashboard/admin` like everyone else.
pub fn dashboard_target(state: &SessionState, path: &Route) -> Option<Route> {
    let role = state.role()?;
    path.is_entry_point().then(|| role.dashboard_route())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    user: UserId,
    role: Role,
    path: Route,
}

/// Sends authenticated users from entry points to their role dashboard.
///
/// The redirect fires on the transition into the redirect condition, not on
/// every observation of it: observing the same user, role and path again
/// does nothing until the condition has been false in between.
#[derive(Debug, Clone, Default)]
pub struct RedirectDispatcher {
    armed: Option<Edge>,
}

impl RedirectDispatcher {
    /// A dispatcher that has not fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the session at `path`, navigating if this observation is a
    /// new edge into the redirect condition. Returns the route navigated
    /// to, if any.
    pub fn observe(
        &mut self,
        state: &SessionState,
        path: &Route,
        navigator: &impl Navigator,
    ) -> Option<Route> {
        let (Some(target), Some(profile)) = (dashboard_target(state, path), state.profile()) else {
            self.armed = None;
            return None;
        };

        let edge = Edge {
            user: profile.id.clone(),
            role: profile.role,
            path: path.clone(),
        };
        if self.armed.as_ref() == Some(&edge) {
            return None;
        }

        debug!(user = %edge.user, role = %edge.role, from = %path, to = %target, "Role redirect");
        navigator.navigate(&target);
        self.armed = Some(edge);
        Some(target)
    }
}
