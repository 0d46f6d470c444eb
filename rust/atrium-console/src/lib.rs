#![warn(missing_docs)]

//! Leptos bindings for the Atrium access core.
//!
//! Department views in the console are plain CRUD screens. What they share
//! is the question of whether the current user may see them, which
//! [`atrium_access`] answers. This crate puts those answers into the
//! component tree:
//!
//! ```text
//! SessionProvider            (SessionContext ─▸ RwSignal<SessionState>)
//! ├── RoleRedirect           (entry points ─▸ /dashboard/<role>)
//! └── Router views
//!     ├── Protected          (RouteGuard: loading / landing / content / redirect)
//!     │   └── FeatureGate    (AccessResolver::has_feature_access)
//!     └── ...
//! ```
//!
//! [`components::SessionProvider`] subscribes to the session and mirrors
//! every transition into a signal, so the components below re-render on
//! the transition itself rather than polling. It also starts the first
//! resolution when it mounts in the browser.
//!
//! Every component fails closed: protected children are only created for
//! an authenticated session whose role passes the guard, and a feature gate
//! shows its fallback until a lookup has explicitly allowed the feature.

pub mod components;

/// Route panics to the browser console.
///
/// Does nothing on native targets.
pub fn install_panic_hook() {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    console_error_panic_hook::set_once();
}
