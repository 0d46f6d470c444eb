//! Contracts for the external stores the access core reads from.
//!
//! Both stores are implemented outside this crate (document store,
//! relational store, HTTP backend). Implementations report failures through
//! the error types; the core decides what each failure means for the user.

use async_trait::async_trait;

use crate::{
    ConditionalSync, FeatureKey, FeatureLookupError, Identity, IdentityResolutionError, Profile,
    ProfileFetchError, Subject, UserId,
};

/// Source of the current identity and its profile.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait IdentityStore: ConditionalSync {
    /// Resolve the identity of the current credential, if there is one.
    ///
    /// `Ok(None)` means "nobody is signed in" and is not an error.
    async fn resolve_identity(&self) -> Result<Option<Identity>, IdentityResolutionError>;

    /// Load the profile of an identity that has already been resolved.
    ///
    /// Implementations that read untyped records should convert them with
    /// [`Profile::try_from`](crate::ProfileRecord) so unknown roles are
    /// rejected here rather than deeper in the console.
    async fn fetch_profile(&self, user: &UserId) -> Result<Profile, ProfileFetchError>;

    /// End the session backing `identity`.
    async fn invalidate(&self, identity: &Identity) -> Result<(), IdentityResolutionError>;
}

/// Source of per-user and per-role feature grants.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait FeatureAccessStore: ConditionalSync {
    /// The effective grant for `(subject, feature)`, or `None` if there is
    /// no grant for that pair.
    async fn get_grant(
        &self,
        subject: &Subject,
        feature: &FeatureKey,
    ) -> Result<Option<bool>, FeatureLookupError>;
}
