use tracing::debug;

use crate::{AccessSettings, Navigator, RoleSet, Route, SessionState};

/// What a protected view should do for a given session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show a loading indicator; the session is not settled enough to
    /// decide.
    Loading,
    /// Show the public landing content in place of the protected view.
    Landing,
    /// Show the protected content.
    Protected,
    /// Navigate elsewhere and render nothing.
    Redirect(Route),
}

impl GuardOutcome {
    /// Whether protected content may be shown.
    pub fn is_protected(&self) -> bool {
        matches!(self, GuardOutcome::Protected)
    }
}

/// Decide what a view protected by `allowed` renders for `state`.
///
/// | state                          | no `allowed`      | with `allowed`             |
/// |--------------------------------|-------------------|----------------------------|
/// | uninitialized, loading         | loading           | loading                    |
/// | anonymous                      | landing           | redirect to landing route  |
/// | authenticated, no profile      | loading           | loading                    |
/// | authenticated, role allowed    | protected         | protected                  |
/// | authenticated, role not allowed| n/a               | redirect to fallback route |
///
/// Only [`SessionState::Authenticated`] can yield
/// [`GuardOutcome::Protected`].
pub fn guard_outcome(
    state: &SessionState,
    allowed: Option<&RoleSet>,
    settings: &AccessSettings,
) -> GuardOutcome {
    match state {
        SessionState::Uninitialized
        | SessionState::Loading
        | SessionState::AuthenticatedNoProfile { .. } => GuardOutcome::Loading,
        SessionState::Anonymous => match allowed {
            None => GuardOutcome::Landing,
            Some(_) => GuardOutcome::Redirect(settings.landing_route.clone()),
        },
        SessionState::Authenticated { profile, .. } => match allowed {
            Some(allowed) if !allowed.contains(profile.role) => {
                GuardOutcome::Redirect(settings.fallback_route.clone())
            }
            _ => GuardOutcome::Protected,
        },
    }
}

/// A route protection point with memory of the redirect it last issued.
///
/// [`step`](RouteGuard::step) is meant to be called on every session
/// change. It issues a redirect the first time an outcome asks for it and
/// stays quiet while the outcome keeps asking for the same route. Any
/// non-redirect outcome rearms it.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    allowed: Option<RoleSet>,
    settings: AccessSettings,
    issued: Option<Route>,
}

impl RouteGuard {
    /// A guard for a view restricted to `allowed`, or open to any
    /// authenticated user when `None`.
    pub fn new(allowed: Option<RoleSet>, settings: &AccessSettings) -> Self {
        Self {
            allowed,
            settings: settings.clone(),
            issued: None,
        }
    }

    /// The roles this guard admits.
    pub fn allowed(&self) -> Option<&RoleSet> {
        self.allowed.as_ref()
    }

    /// The outcome for `state`, without side effects.
    pub fn evaluate(&self, state: &SessionState) -> GuardOutcome {
        guard_outcome(state, self.allowed.as_ref(), &self.settings)
    }

    /// Evaluate `state` and issue any redirect it calls for through
    /// `navigator`.
    pub fn step(&mut self, state: &SessionState, navigator: &impl Navigator) -> GuardOutcome {
        let outcome = self.evaluate(state);
        match &outcome {
            GuardOutcome::Redirect(route) => {
                if self.issued.as_ref() != Some(route) {
                    debug!(%route, phase = state.phase(), "Guard redirect");
                    navigator.navigate(route);
                    self.issued = Some(route.clone());
                }
            }
            _ => self.issued = None,
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Role;
    use crate::helpers::{RecordingNavigator, identity, profile};

    fn authenticated(role: Role) -> SessionState {
        SessionState::Authenticated {
            identity: identity("kai"),
            profile: profile("kai", role),
        }
    }

    #[test]
    fn it_waits_while_the_session_is_unsettled() {
        let settings = AccessSettings::default();
        let unsettled = [
            SessionState::Uninitialized,
            SessionState::Loading,
            SessionState::AuthenticatedNoProfile {
                identity: identity("kai"),
            },
        ];
        for state in &unsettled {
            assert_eq!(guard_outcome(state, None, &settings), GuardOutcome::Loading);
            assert_eq!(
                guard_outcome(state, Some(&RoleSet::all()), &settings),
                GuardOutcome::Loading
            );
        }
    }

    #[test]
    fn anonymous_users_see_landing_or_are_sent_there() {
        let settings = AccessSettings::default();
        assert_eq!(
            guard_outcome(&SessionState::Anonymous, None, &settings),
            GuardOutcome::Landing
        );
        assert_eq!(
            guard_outcome(&SessionState::Anonymous, Some(&Role::Admin.into()), &settings),
            GuardOutcome::Redirect(Route::home())
        );
    }

    #[test]
    fn disallowed_roles_go_to_the_fallback_route() {
        let settings = AccessSettings::default();
        let staff_only = RoleSet::from([Role::Admin, Role::Staff]);
        assert_eq!(
            guard_outcome(&authenticated(Role::Student), Some(&staff_only), &settings),
            GuardOutcome::Redirect(Route::dashboard())
        );
        assert_eq!(
            guard_outcome(&authenticated(Role::Staff), Some(&staff_only), &settings),
            GuardOutcome::Protected
        );
        assert_eq!(
            guard_outcome(&authenticated(Role::Student), None, &settings),
            GuardOutcome::Protected
        );
    }

    #[test]
    fn an_empty_role_set_admits_nobody() {
        let settings = AccessSettings::default();
        for role in Role::ALL {
            let outcome = guard_outcome(&authenticated(role), Some(&RoleSet::empty()), &settings);
            assert!(!outcome.is_protected());
        }
    }

    #[test]
    fn it_issues_each_redirect_once() {
        let navigator = RecordingNavigator::default();
        let mut guard = RouteGuard::new(Some(Role::Admin.into()), &AccessSettings::default());

        guard.step(&SessionState::Anonymous, &navigator);
        guard.step(&SessionState::Anonymous, &navigator);
        assert_eq!(navigator.routes(), vec![Route::home()]);

        guard.step(&authenticated(Role::Trainer), &navigator);
        guard.step(&authenticated(Role::Trainer), &navigator);
        assert_eq!(navigator.routes(), vec![Route::home(), Route::dashboard()]);
    }

    #[test]
    fn it_rearms_after_a_non_redirect_outcome() {
        let navigator = RecordingNavigator::default();
        let mut guard = RouteGuard::new(Some(Role::Admin.into()), &AccessSettings::default());

        guard.step(&SessionState::Anonymous, &navigator);
        guard.step(&SessionState::Loading, &navigator);
        guard.step(&SessionState::Anonymous, &navigator);

        assert_eq!(navigator.routes(), vec![Route::home(), Route::home()]);
    }

    #[test]
    fn it_honours_configured_routes() -> anyhow::Result<()> {
        let settings = AccessSettings::from_json(
            r#"{ "landing_route": "/welcome", "fallback_route": "/dashboard/overview" }"#,
        )?;
        let navigator = |route: &Route| assert_eq!(route.as_str(), "/welcome");
        let mut guard = RouteGuard::new(Some(Role::Staff.into()), &settings);

        assert_eq!(
            guard.step(&SessionState::Anonymous, &navigator),
            GuardOutcome::Redirect(Route::parse("/welcome")?)
        );
        assert_eq!(
            guard.evaluate(&authenticated(Role::Student)),
            GuardOutcome::Redirect(Route::parse("/dashboard/overview")?)
        );
        Ok(())
    }
}
