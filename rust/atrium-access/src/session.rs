use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::{AccessSettings, Identity, IdentityStore, Profile, ProfileFetchError, SessionState};

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct SessionCell {
    state: SessionState,
    epoch: u64,
    resolving: bool,
    pending: Option<Identity>,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// The single writer of [`SessionState`].
///
/// Cloning a `SessionContext` yields another handle to the same session.
/// Readers take snapshots with [`state`](SessionContext::state) or register
/// a listener with [`subscribe`](SessionContext::subscribe); only
/// [`initialize`](SessionContext::initialize) and
/// [`logout`](SessionContext::logout) change the state.
///
/// Every resolution and every logout starts a new epoch. A resolution that
/// finishes after its epoch has been superseded is dropped without touching
/// the state, so a slow identity lookup cannot sign a user back in after
/// they logged out.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn IdentityStore>,
    profile_fetch_retries: u8,
    cell: Arc<Mutex<SessionCell>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl SessionContext {
    /// Create an uninitialized session backed by `store`.
    pub fn new(store: Arc<dyn IdentityStore>, settings: &AccessSettings) -> Self {
        Self {
            store,
            profile_fetch_retries: settings.profile_fetch_retries,
            cell: Arc::new(Mutex::new(SessionCell {
                state: SessionState::Uninitialized,
                epoch: 0,
                resolving: false,
                pending: None,
            })),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.cell.lock().state.clone()
    }

    pub(crate) fn snapshot(&self) -> (u64, SessionState) {
        let cell = self.cell.lock();
        (cell.epoch, cell.state.clone())
    }

    /// Whether a resolution is in flight.
    pub fn is_resolving(&self) -> bool {
        self.cell.lock().resolving
    }

    /// Register `listener` to be called after every state transition.
    ///
    /// Listeners run on the task that made the transition, after the new
    /// state is visible through [`state`](SessionContext::state). The
    /// listener stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let mut registry = self.listeners.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    /// Resolve the identity and then its profile.
    ///
    /// Calling this while a resolution is already in flight does nothing;
    /// the running resolution settles the state for both callers. Calling it
    /// on a settled session re-resolves from [`SessionState::Loading`].
    pub async fn initialize(&self) {
        let epoch = {
            let mut cell = self.cell.lock();
            if cell.resolving {
                debug!(epoch = cell.epoch, "Session resolution already in flight");
                return;
            }
            cell.resolving = true;
            cell.pending = None;
            cell.epoch += 1;
            cell.epoch
        };

        self.transition(epoch, SessionState::Loading);
        self.resolve(epoch).await;

        let mut cell = self.cell.lock();
        if cell.epoch == epoch {
            cell.resolving = false;
        }
    }

    async fn resolve(&self, epoch: u64) {
        let identity = match self.store.resolve_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                debug!("No identity to resolve");
                self.transition(epoch, SessionState::Anonymous);
                return;
            }
            Err(err) => {
                error!(error = %err, "Failed to resolve identity");
                self.transition(epoch, SessionState::Anonymous);
                return;
            }
        };

        if !self.adopt(epoch, &identity).await {
            return;
        }

        let attempts = 1 + u32::from(self.profile_fetch_retries);
        for attempt in 1..=attempts {
            if !self.is_current(epoch) {
                debug!(epoch, "Dropping superseded session resolution");
                return;
            }

            match self.fetch_profile(&identity).await {
                Ok(profile) => {
                    debug!(user = %identity.user_id(), role = %profile.role, "Session authenticated");
                    self.transition(epoch, SessionState::Authenticated { identity, profile });
                    return;
                }
                Err(err) => {
                    self.transition(
                        epoch,
                        SessionState::AuthenticatedNoProfile {
                            identity: identity.clone(),
                        },
                    );
                    if attempt < attempts {
                        warn!(user = %identity.user_id(), attempt, error = %err, "Profile fetch failed, retrying");
                    } else {
                        error!(user = %identity.user_id(), attempt, error = %err, "Profile fetch failed");
                    }
                }
            }
        }
    }

    /// Record `identity` as the credential being resolved for `epoch`.
    ///
    /// Returns `false` when the epoch has been superseded. If the session
    /// was logged out in the meantime and nothing newer is resolving, the
    /// orphaned credential is invalidated.
    async fn adopt(&self, epoch: u64, identity: &Identity) -> bool {
        let orphaned = {
            let mut cell = self.cell.lock();
            if cell.epoch == epoch {
                cell.pending = Some(identity.clone());
                return true;
            }
            !cell.resolving && cell.state == SessionState::Anonymous
        };

        debug!(epoch, "Dropping superseded session resolution");
        if orphaned {
            self.invalidate(identity).await;
        }
        false
    }

    async fn fetch_profile(&self, identity: &Identity) -> Result<Profile, ProfileFetchError> {
        let profile = self.store.fetch_profile(identity.user_id()).await?;
        if &profile.id != identity.user_id() {
            return Err(ProfileFetchError::Mismatch {
                expected: identity.user_id().clone(),
                found: profile.id,
            });
        }
        Ok(profile)
    }

    /// End the session.
    ///
    /// The state is [`SessionState::Anonymous`] by the time the first await
    /// point is reached, and any resolution still in flight is discarded
    /// when it finishes. The previous identity, or the one still waiting on
    /// its profile, is then invalidated in the store; a failure there is
    /// logged and otherwise ignored.
    pub async fn logout(&self) {
        let (identity, changed) = {
            let mut cell = self.cell.lock();
            cell.epoch += 1;
            cell.resolving = false;
            let pending = cell.pending.take();
            let previous = std::mem::replace(&mut cell.state, SessionState::Anonymous);
            let changed = previous != SessionState::Anonymous;
            (previous.identity().cloned().or(pending), changed)
        };

        if changed {
            self.notify(&SessionState::Anonymous);
        }

        if let Some(identity) = identity {
            self.invalidate(&identity).await;
        }
    }

    async fn invalidate(&self, identity: &Identity) {
        debug!(user = %identity.user_id(), "Invalidating session");
        if let Err(err) = self.store.invalidate(identity).await {
            warn!(user = %identity.user_id(), error = %err, "Failed to invalidate session");
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.cell.lock().epoch == epoch
    }

    fn transition(&self, epoch: u64, next: SessionState) {
        {
            let mut cell = self.cell.lock();
            if cell.epoch != epoch {
                debug!(epoch, current = cell.epoch, phase = next.phase(), "Dropping stale transition");
                return;
            }
            if cell.state == next {
                return;
            }
            debug!(from = cell.state.phase(), to = next.phase(), "Session transition");
            cell.state = next.clone();
        }

        self.notify(&next);
    }

    fn notify(&self, state: &SessionState) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(state);
        }
    }
}

/// Handle returned by [`SessionContext::subscribe`].
///
/// Dropping it removes the listener.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
