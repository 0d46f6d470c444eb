use atrium_access::{RedirectDispatcher, Route};
use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use tracing::warn;

use super::{router_navigator, use_session};

/// Sends signed-in users from `/` and `/dashboard` to their role dashboard.
///
/// Mount once, inside the router and the [`SessionProvider`](super::SessionProvider).
/// Renders nothing.
#[component]
pub fn RoleRedirect() -> impl IntoView {
    let session = use_session();
    let location = use_location();
    let navigator = router_navigator(use_navigate());
    let dispatcher = StoredValue::new(RedirectDispatcher::new());

    Effect::new(move |_| {
        let state = session.state.get();
        let pathname = location.pathname.get();

        let path = match Route::parse(&pathname) {
            Ok(path) => path,
            Err(err) => {
                warn!(%pathname, error = %err, "Ignoring unroutable location");
                return;
            }
        };

        dispatcher.update_value(|dispatcher| {
            dispatcher.observe(&state, &path, &navigator);
        });
    });
}
