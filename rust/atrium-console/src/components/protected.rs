//! Declarative route protection.

use atrium_access::{GuardOutcome, RoleSet, RouteGuard};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use super::{router_navigator, use_session};

/// Renders `children` only for an authenticated user whose role passes
/// `allowed_roles`.
///
/// While the session is unsettled (or the profile is still missing) a
/// loading indicator is shown. Without `allowed_roles`, an anonymous
/// visitor sees `landing`; with them, the visitor is sent to the landing
/// route. A signed-in user with the wrong role is sent to the fallback
/// route. Each redirect is issued once per change of outcome.
///
/// ```rust,ignore
/// view! {
///     <Protected allowed_roles=RoleSet::from([Role::Admin, Role::Staff])>
///         <PayrollRuns />
///     </Protected>
/// }
/// ```
#[component]
pub fn Protected(
    /// Roles admitted to the view; any authenticated role when omitted.
    #[prop(optional, into)]
    allowed_roles: Option<RoleSet>,
    /// Public content shown to anonymous visitors of an unrestricted view.
    #[prop(optional, into)]
    landing: ViewFn,
    children: ChildrenFn,
) -> impl IntoView {
    let session = use_session();
    let guard = StoredValue::new(RouteGuard::new(allowed_roles, &session.settings()));
    let navigator = router_navigator(use_navigate());

    Effect::new(move |_| {
        let state = session.state.get();
        guard.update_value(|guard| {
            guard.step(&state, &navigator);
        });
    });

    move || {
        let outcome = session
            .state
            .with(|state| guard.with_value(|guard| guard.evaluate(state)));

        match outcome {
            GuardOutcome::Protected => children().into_any(),
            GuardOutcome::Landing => landing.run(),
            GuardOutcome::Loading => view! { <p class="loading">"Loading..."</p> }.into_any(),
            GuardOutcome::Redirect(_) => ().into_any(),
        }
    }
}
