//! In-memory stores and a recording navigator for tests and demos.
//!
//! Every type here is a cheap, cloneable handle over shared state, so a test
//! can keep one clone to script and inspect while the session or resolver
//! owns another.
//!
//! ```
//! use std::sync::Arc;
//! use atrium_access::helpers::{MemoryIdentityStore, identity, profile};
//! use atrium_access::{AccessSettings, Role, SessionContext};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryIdentityStore::default();
//! store.sign_in(identity("ada"), Some(profile("ada", Role::Admin)));
//!
//! let session = SessionContext::new(Arc::new(store.clone()), &AccessSettings::default());
//! session.initialize().await;
//! assert_eq!(session.state().role(), Some(Role::Admin));
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    FeatureAccessStore, FeatureKey, FeatureLookupError, Identity, IdentityResolutionError,
    IdentityStore, Navigator, Profile, ProfileFetchError, ProfileStatus, Role, Route, Subject,
    UserId,
};

/// An identity for `user` with a token derived from the id.
pub fn identity(user: &str) -> Identity {
    Identity::new(user, format!("token-{user}"))
}

/// An active profile for `user` holding `role`.
pub fn profile(user: &str, role: Role) -> Profile {
    Profile {
        id: UserId::new(user),
        role,
        full_name: user.to_string(),
        email: format!("{user}@example.org"),
        status: ProfileStatus::Active,
    }
}

/// A shared open/closed switch that async calls wait on.
#[derive(Clone)]
struct Gate(Arc<watch::Sender<bool>>);

impl Default for Gate {
    fn default() -> Self {
        let (held, _) = watch::channel(false);
        Self(Arc::new(held))
    }
}

impl Gate {
    fn hold(&self) {
        self.0.send_replace(true);
    }

    fn release(&self) {
        self.0.send_replace(false);
    }

    async fn pass(&self) {
        let mut held = self.0.subscribe();
        let _ = held.wait_for(|held| !*held).await;
    }
}

#[derive(Default)]
struct IdentityFixture {
    current: Option<Identity>,
    profiles: HashMap<UserId, Profile>,
    identity_error: Option<IdentityResolutionError>,
    profile_failures: usize,
    resolve_calls: usize,
    profile_calls: usize,
    invalidated: Vec<Identity>,
}

/// A scriptable [`IdentityStore`].
///
/// [`hold`](MemoryIdentityStore::hold) makes `resolve_identity` park until
/// [`release`](MemoryIdentityStore::release) is called, and
/// [`hold_profiles`](MemoryIdentityStore::hold_profiles) does the same for
/// `fetch_profile`. That lets a test interleave other operations with an
/// in-flight resolution.
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    fixture: Arc<Mutex<IdentityFixture>>,
    gate: Gate,
    profile_gate: Gate,
}

impl MemoryIdentityStore {
    /// Make `identity` the current credential, with `profile` (if any) as
    /// its stored profile.
    pub fn sign_in(&self, identity: Identity, profile: Option<Profile>) {
        let mut fixture = self.fixture.lock();
        match profile {
            Some(profile) => {
                fixture.profiles.insert(identity.user_id().clone(), profile);
            }
            None => {
                fixture.profiles.remove(identity.user_id());
            }
        }
        fixture.current = Some(identity);
    }

    /// Drop the current credential, as if it were revoked elsewhere.
    pub fn sign_out_remote(&self) {
        self.fixture.lock().current = None;
    }

    /// Fail every `resolve_identity` call with `error` until
    /// [`clear_identity_error`](MemoryIdentityStore::clear_identity_error).
    pub fn fail_identity(&self, error: IdentityResolutionError) {
        self.fixture.lock().identity_error = Some(error);
    }

    /// Stop failing `resolve_identity`.
    pub fn clear_identity_error(&self) {
        self.fixture.lock().identity_error = None;
    }

    /// Fail the next `times` profile fetches.
    pub fn fail_profile_times(&self, times: usize) {
        self.fixture.lock().profile_failures = times;
    }

    /// Park `resolve_identity` calls until [`release`](MemoryIdentityStore::release).
    pub fn hold(&self) {
        self.gate.hold();
    }

    /// Let parked `resolve_identity` calls continue.
    pub fn release(&self) {
        self.gate.release();
    }

    /// Park `fetch_profile` calls until
    /// [`release_profiles`](MemoryIdentityStore::release_profiles).
    pub fn hold_profiles(&self) {
        self.profile_gate.hold();
    }

    /// Let parked `fetch_profile` calls continue.
    pub fn release_profiles(&self) {
        self.profile_gate.release();
    }

    /// How many times `resolve_identity` was called.
    pub fn resolve_calls(&self) -> usize {
        self.fixture.lock().resolve_calls
    }

    /// How many times `fetch_profile` was called.
    pub fn profile_calls(&self) -> usize {
        self.fixture.lock().profile_calls
    }

    /// Identities passed to `invalidate`, in call order.
    pub fn invalidated(&self) -> Vec<Identity> {
        self.fixture.lock().invalidated.clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl IdentityStore for MemoryIdentityStore {
    async fn resolve_identity(&self) -> Result<Option<Identity>, IdentityResolutionError> {
        self.fixture.lock().resolve_calls += 1;
        self.gate.pass().await;

        let fixture = self.fixture.lock();
        match &fixture.identity_error {
            Some(error) => Err(error.clone()),
            None => Ok(fixture.current.clone()),
        }
    }

    async fn fetch_profile(&self, user: &UserId) -> Result<Profile, ProfileFetchError> {
        self.fixture.lock().profile_calls += 1;
        self.profile_gate.pass().await;

        let mut fixture = self.fixture.lock();
        if fixture.profile_failures > 0 {
            fixture.profile_failures -= 1;
            return Err(ProfileFetchError::Unavailable("profile store offline".into()));
        }

        fixture
            .profiles
            .get(user)
            .cloned()
            .ok_or_else(|| ProfileFetchError::NotFound(user.clone()))
    }

    async fn invalidate(&self, identity: &Identity) -> Result<(), IdentityResolutionError> {
        let mut fixture = self.fixture.lock();
        fixture.invalidated.push(identity.clone());
        if fixture.current.as_ref() == Some(identity) {
            fixture.current = None;
        }
        Ok(())
    }
}

#[derive(Default)]
struct FeatureFixture {
    grants: HashMap<(Subject, FeatureKey), bool>,
    failing: bool,
    lookups: Vec<(Subject, FeatureKey)>,
}

/// A [`FeatureAccessStore`] over an in-memory grant table.
///
/// [`hold`](MemoryFeatureAccessStore::hold) parks lookups until
/// [`release`](MemoryFeatureAccessStore::release).
#[derive(Clone, Default)]
pub struct MemoryFeatureAccessStore {
    fixture: Arc<Mutex<FeatureFixture>>,
    gate: Gate,
}

impl MemoryFeatureAccessStore {
    /// Record a grant, replacing any earlier one for the same pair.
    pub fn grant(&self, subject: Subject, feature: FeatureKey, granted: bool) {
        self.fixture
            .lock()
            .grants
            .insert((subject, feature), granted);
    }

    /// Remove the grant for a pair.
    pub fn revoke(&self, subject: &Subject, feature: &FeatureKey) {
        self.fixture
            .lock()
            .grants
            .remove(&(subject.clone(), feature.clone()));
    }

    /// Make every lookup fail while `failing` is set.
    pub fn fail(&self, failing: bool) {
        self.fixture.lock().failing = failing;
    }

    /// Park `get_grant` calls until [`release`](MemoryFeatureAccessStore::release).
    pub fn hold(&self) {
        self.gate.hold();
    }

    /// Let parked `get_grant` calls continue.
    pub fn release(&self) {
        self.gate.release();
    }

    /// Every `(subject, feature)` pair looked up, in call order.
    pub fn lookups(&self) -> Vec<(Subject, FeatureKey)> {
        self.fixture.lock().lookups.clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl FeatureAccessStore for MemoryFeatureAccessStore {
    async fn get_grant(
        &self,
        subject: &Subject,
        feature: &FeatureKey,
    ) -> Result<Option<bool>, FeatureLookupError> {
        self.fixture
            .lock()
            .lookups
            .push((subject.clone(), feature.clone()));
        self.gate.pass().await;

        let fixture = self.fixture.lock();
        if fixture.failing {
            return Err(FeatureLookupError::Unavailable(
                "feature access store offline".into(),
            ));
        }

        Ok(fixture
            .grants
            .get(&(subject.clone(), feature.clone()))
            .copied())
    }
}

/// A [`Navigator`] that remembers every route it was asked to visit.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    /// Routes navigated to, in order.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.routes.lock().push(route.clone());
    }
}
