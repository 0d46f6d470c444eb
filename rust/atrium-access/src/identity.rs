use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Stable identifier of a console user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An authenticated principal issued by an [`IdentityStore`].
///
/// The token is opaque to this crate. It is kept so the store can be asked
/// to invalidate exactly this session on logout, and it is redacted from
/// `Debug` output so it never reaches a log line.
///
/// [`IdentityStore`]: crate::IdentityStore
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    token: String,
}

impl Identity {
    /// Create an identity for `user_id` backed by `token`.
    pub fn new(user_id: impl Into<UserId>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// The user this identity authenticates.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The opaque session token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
