use crate::{RoleParseError, UserId};

/// Failure to resolve the current identity from an [`IdentityStore`].
///
/// The session treats every variant the same way (it settles in
/// [`SessionState::Anonymous`]); the distinction exists for logging.
///
/// [`IdentityStore`]: crate::IdentityStore
/// [`SessionState::Anonymous`]: crate::SessionState::Anonymous
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityResolutionError {
    /// The identity provider could not be reached.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused the stored credential.
    #[error("Credential rejected: {0}")]
    Rejected(String),

    /// The stored credential is past its expiry.
    #[error("Credential expired")]
    Expired,
}

/// Failure to load the profile of an already resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileFetchError {
    /// No profile record exists for the user.
    #[error("No profile for user '{0}'")]
    NotFound(UserId),

    /// The profile backend could not be reached.
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    /// The stored role is not one of the known roles.
    #[error("Invalid role in profile: {0}")]
    InvalidRole(#[from] RoleParseError),

    /// The stored status is not one of the known statuses.
    #[error("Invalid status in profile: '{0}'")]
    InvalidStatus(String),

    /// The store returned a profile that belongs to somebody else.
    #[error("Profile mismatch: expected '{expected}', found '{found}'")]
    Mismatch {
        /// The user id of the resolved identity.
        expected: UserId,
        /// The user id on the returned profile.
        found: UserId,
    },
}

/// Failure to read a grant from a [`FeatureAccessStore`].
///
/// [`FeatureAccessStore`]: crate::FeatureAccessStore
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureLookupError {
    /// The grant backend could not be reached.
    #[error("Feature access store unavailable: {0}")]
    Unavailable(String),

    /// The backend holds a grant whose key is not a valid feature key.
    #[error("Malformed grant: {0}")]
    Malformed(String),
}
