//! Session context for the component tree.

use atrium_access::{AccessResolver, AccessSettings, SessionContext, SessionState};
use leptos::prelude::*;

#[derive(Clone)]
struct Services {
    session: SessionContext,
    resolver: AccessResolver,
    settings: AccessSettings,
}

/// Reactive handle to the session, provided by [`SessionProvider`].
///
/// `state` is updated on every session transition. The session, resolver
/// and settings are kept in local storage because browser-backed stores
/// are not `Send`.
#[derive(Clone, Copy)]
pub struct ConsoleSession {
    /// The current session state.
    pub state: RwSignal<SessionState>,
    services: StoredValue<Services, LocalStorage>,
}

impl ConsoleSession {
    /// Mirror `session` into a signal owned by the current reactive owner.
    ///
    /// The mirror stops when the owner is cleaned up.
    pub fn new(session: SessionContext, resolver: AccessResolver, settings: AccessSettings) -> Self {
        let state = RwSignal::new(session.state());
        let subscription = session.subscribe(move |next| state.set(next.clone()));
        on_cleanup(move || drop(subscription));

        Self {
            state,
            services: StoredValue::new_local(Services {
                session,
                resolver,
                settings,
            }),
        }
    }

    /// The underlying session context.
    pub fn session(&self) -> SessionContext {
        self.services.with_value(|services| services.session.clone())
    }

    /// The access resolver bound to the session.
    pub fn resolver(&self) -> AccessResolver {
        self.services.with_value(|services| services.resolver.clone())
    }

    /// The settings guards and redirects are built with.
    pub fn settings(&self) -> AccessSettings {
        self.services.with_value(|services| services.settings.clone())
    }

    /// End the session in the background. The state signal flips to
    /// anonymous before the store is asked to invalidate the credential.
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    pub fn logout(&self) {
        let session = self.session();
        wasm_bindgen_futures::spawn_local(async move { session.logout().await });
    }
}

/// The [`ConsoleSession`] provided by the nearest [`SessionProvider`].
///
/// # Panics
///
/// Panics when called outside a [`SessionProvider`].
pub fn use_session() -> ConsoleSession {
    expect_context::<ConsoleSession>()
}

/// Provides the session to its children and keeps it resolved.
///
/// In the browser the provider starts [`SessionContext::initialize`] when it
/// mounts. Elsewhere the host is responsible for initializing the session.
#[component]
pub fn SessionProvider(
    /// The session to expose.
    session: SessionContext,
    /// Resolver bound to `session`.
    resolver: AccessResolver,
    /// Routes and tunables for guards; defaults apply when omitted.
    #[prop(optional)]
    settings: Option<AccessSettings>,
    /// The console views.
    children: Children,
) -> impl IntoView {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        let session = session.clone();
        wasm_bindgen_futures::spawn_local(async move { session.initialize().await });
    }

    provide_context(ConsoleSession::new(
        session,
        resolver,
        settings.unwrap_or_default(),
    ));

    children()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use atrium_access::Role;
    use atrium_access::helpers::{MemoryFeatureAccessStore, MemoryIdentityStore, identity, profile};

    use super::*;

    fn console(identities: MemoryIdentityStore) -> (SessionContext, ConsoleSession) {
        let settings = AccessSettings::default();
        let session = SessionContext::new(Arc::new(identities), &settings);
        let resolver = AccessResolver::new(
            session.clone(),
            Arc::new(MemoryFeatureAccessStore::default()),
            &settings,
        );
        let console = ConsoleSession::new(session.clone(), resolver, settings);
        (session, console)
    }

    #[tokio::test]
    async fn the_state_signal_follows_the_session() {
        let owner = Owner::new();
        owner.set();

        let identities = MemoryIdentityStore::default();
        identities.sign_in(identity("ada"), Some(profile("ada", Role::Admin)));
        let (session, console) = console(identities);
        assert_eq!(console.state.get_untracked(), SessionState::Uninitialized);

        session.initialize().await;
        assert_eq!(console.state.get_untracked().role(), Some(Role::Admin));

        console.session().logout().await;
        assert_eq!(console.state.get_untracked(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn the_mirror_stops_with_its_owner() {
        let owner = Owner::new();
        owner.set();

        let identities = MemoryIdentityStore::default();
        identities.sign_in(identity("ada"), Some(profile("ada", Role::Admin)));
        let (session, console) = console(identities);

        owner.cleanup();
        session.initialize().await;

        assert!(console.state.try_get_untracked().is_none());
        assert_eq!(session.state().role(), Some(Role::Admin));
    }
}
