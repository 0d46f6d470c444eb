//! Leptos components that gate console views on the session.
//!
//! All of them read the session through [`use_session`], so they must be
//! rendered inside a [`SessionProvider`]. [`Protected`] and [`RoleRedirect`]
//! navigate, so they must also be rendered inside a `leptos_router` router.

mod feature_gate;
mod protected;
mod provider;
mod role_redirect;

pub use feature_gate::*;
pub use protected::*;
pub use provider::*;
pub use role_redirect::*;

use atrium_access::Route;
use leptos_router::NavigateOptions;

/// Adapt the router's navigate function to an [`atrium_access::Navigator`].
///
/// Redirects replace the current history entry so the back button does not
/// return to a page that immediately redirects again.
fn router_navigator(
    navigate: impl Fn(&str, NavigateOptions) + Clone,
) -> impl Fn(&Route) + Clone {
    move |route: &Route| {
        navigate(
            route.as_str(),
            NavigateOptions {
                replace: true,
                ..Default::default()
            },
        )
    }
}
