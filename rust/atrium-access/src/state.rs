use crate::{Identity, Profile, Role};

/// Who is signed in, as far as the session currently knows.
///
/// Exactly one shape holds at a time. A session starts
/// [`Uninitialized`](SessionState::Uninitialized), passes through
/// [`Loading`](SessionState::Loading) on every resolution, and settles in
/// one of the remaining three.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No resolution has been attempted yet.
    #[default]
    Uninitialized,
    /// A resolution is in flight.
    Loading,
    /// Resolution finished without a valid identity, or the user logged out.
    Anonymous,
    /// Identity and profile are both known.
    Authenticated {
        /// The signed-in principal.
        identity: Identity,
        /// Their profile.
        profile: Profile,
    },
    /// The identity is valid but its profile is not (yet) available, so no
    /// role-dependent decision can be made.
    AuthenticatedNoProfile {
        /// The signed-in principal.
        identity: Identity,
    },
}

impl SessionState {
    /// The identity, for either authenticated shape.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity, .. }
            | SessionState::AuthenticatedNoProfile { identity } => Some(identity),
            _ => None,
        }
    }

    /// The profile, only when fully authenticated.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Authenticated { profile, .. } => Some(profile),
            _ => None,
        }
    }

    /// The role, only when fully authenticated.
    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    /// Whether a resolution has finished, one way or the other.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Uninitialized | SessionState::Loading)
    }

    /// Short name of the shape, for logs.
    pub fn phase(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::AuthenticatedNoProfile { .. } => "authenticated_no_profile",
        }
    }
}
