use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    AccessSettings, FeatureAccessStore, FeatureKey, FeatureLookupError, Profile, RoleSet,
    SessionContext, SessionState, Subject, Subscription, UserId,
};

/// Whether `state` is authenticated with a role in `allowed`.
///
/// Every other state, including [`SessionState::AuthenticatedNoProfile`],
/// answers `false`.
pub fn has_role(state: &SessionState, allowed: &RoleSet) -> bool {
    state.role().is_some_and(|role| allowed.contains(role))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheScope {
    epoch: u64,
    user: UserId,
}

#[derive(Default)]
struct FeatureCache {
    scope: Option<CacheScope>,
    entries: HashMap<FeatureKey, bool>,
}

impl FeatureCache {
    fn get(&self, scope: &CacheScope, feature: &FeatureKey) -> Option<bool> {
        if self.scope.as_ref() == Some(scope) {
            self.entries.get(feature).copied()
        } else {
            None
        }
    }

    fn insert(&mut self, scope: CacheScope, feature: FeatureKey, granted: bool) {
        if self.scope.as_ref() != Some(&scope) {
            self.entries.clear();
            self.scope = Some(scope);
        }
        self.entries.insert(feature, granted);
    }

    fn clear(&mut self) {
        self.scope = None;
        self.entries.clear();
    }
}

/// Answers role and feature checks for the current session.
///
/// Role checks are answered from the session snapshot. Feature checks go to
/// the [`FeatureAccessStore`]: a grant for the user wins over a grant for
/// their role, and no grant at all means deny. Any lookup failure also
/// means deny.
///
/// Feature answers are cached per session epoch and user. The cache is
/// emptied as soon as the session goes anonymous or switches user, and a
/// lookup that finishes after such a change is neither cached nor allowed.
#[derive(Clone)]
pub struct AccessResolver {
    session: SessionContext,
    store: Arc<dyn FeatureAccessStore>,
    caching: bool,
    cache: Arc<Mutex<FeatureCache>>,
    _subscription: Arc<Subscription>,
}

impl AccessResolver {
    /// Create a resolver reading from `session` and `store`.
    pub fn new(
        session: SessionContext,
        store: Arc<dyn FeatureAccessStore>,
        settings: &AccessSettings,
    ) -> Self {
        let cache = Arc::new(Mutex::new(FeatureCache::default()));

        let watched = cache.clone();
        let subscription = session.subscribe(move |state| {
            let mut cache = watched.lock();
            let stale = match (&cache.scope, state.identity()) {
                (None, _) => false,
                (Some(_), None) => matches!(state, SessionState::Anonymous),
                (Some(scope), Some(identity)) => &scope.user != identity.user_id(),
            };
            if stale {
                debug!("Clearing feature access cache");
                cache.clear();
            }
        });

        Self {
            session,
            store,
            caching: settings.cache_feature_checks,
            cache,
            _subscription: Arc::new(subscription),
        }
    }

    /// Whether the current session holds a role in `allowed`.
    pub fn has_role(&self, allowed: &RoleSet) -> bool {
        has_role(&self.session.state(), allowed)
    }

    /// Whether the current user may use `feature`.
    ///
    /// Never fails: a session without a profile, a missing grant and a
    /// store error all answer `false`.
    pub async fn has_feature_access(&self, feature: &FeatureKey) -> bool {
        let (epoch, state) = self.session.snapshot();
        let Some(profile) = state.profile() else {
            debug!(%feature, phase = state.phase(), "Feature check without a profile");
            return false;
        };

        let scope = CacheScope {
            epoch,
            user: profile.id.clone(),
        };

        if self.caching {
            if let Some(granted) = self.cache.lock().get(&scope, feature) {
                return granted;
            }
        }

        let granted = match self.check_feature(profile, feature).await {
            Ok(granted) => granted,
            Err(err) => {
                error!(user = %profile.id, %feature, error = %err, "Feature lookup failed");
                return false;
            }
        };

        let (current_epoch, current) = self.session.snapshot();
        if current_epoch != epoch || current.profile().map(|current| &current.id) != Some(&profile.id)
        {
            debug!(%feature, "Session changed during feature lookup");
            return false;
        }

        if self.caching {
            self.cache.lock().insert(scope, feature.clone(), granted);
        }

        granted
    }

    /// The effective grant of `feature` for `profile`, without caching.
    ///
    /// A grant for the user wins; otherwise the grant for their role
    /// applies; otherwise the answer is `false`.
    pub async fn check_feature(
        &self,
        profile: &Profile,
        feature: &FeatureKey,
    ) -> Result<bool, FeatureLookupError> {
        let user = Subject::User(profile.id.clone());
        if let Some(granted) = self.store.get_grant(&user, feature).await? {
            return Ok(granted);
        }

        let role = Subject::Role(profile.role);
        if let Some(granted) = self.store.get_grant(&role, feature).await? {
            return Ok(granted);
        }

        Ok(false)
    }

    /// Drop every cached feature answer.
    ///
    /// Useful after an administrator edits grants for the signed-in user.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}
