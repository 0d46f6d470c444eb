#![warn(missing_docs)]

//! Session bootstrapping and access control for the Atrium console.
//!
//! The console is mostly CRUD views over department data (HR, education,
//! incubation, inventory, job centre). This crate holds the one part of it
//! that has to make decisions: who is signed in, what role they hold, which
//! features they may use, and what a protected view should render while
//! that information is still arriving.
//!
//! # Components
//!
//! ```text
//! IdentityStore ──▸ SessionContext ──┬──▸ AccessResolver ◂── FeatureAccessStore
//!                   (single writer)  │
//!                                    ├──▸ RouteGuard ──────┐
//!                                    │                     ├──▸ Navigator
//!                                    └──▸ RedirectDispatcher┘
//! ```
//!
//! - **[`SessionContext`]** owns the authoritative [`SessionState`]. It is
//!   the only writer; everything else reads a snapshot or subscribes.
//!   [`SessionContext::initialize`] resolves identity and then profile,
//!   [`SessionContext::logout`] drops back to [`SessionState::Anonymous`].
//! - **[`AccessResolver`]** answers role checks synchronously from the
//!   session snapshot ([`has_role`]) and feature checks asynchronously
//!   against a [`FeatureAccessStore`]. Every failure resolves to "deny".
//! - **[`RouteGuard`]** turns a session snapshot into a [`GuardOutcome`]:
//!   a loading indicator, the public landing page, protected content, or a
//!   redirect.
//! - **[`RedirectDispatcher`]** sends an authenticated user from a generic
//!   entry point (`/`, `/dashboard`) to their role's dashboard, once per
//!   transition into that condition.
//!
//! # Failure model
//!
//! Nothing in this crate surfaces an error to the rendering layer. Identity
//! failures settle in [`SessionState::Anonymous`], profile failures in
//! [`SessionState::AuthenticatedNoProfile`] (which guards render as
//! loading), and feature lookup failures as a denied check. Failures are
//! reported through [`tracing`].
//!
//! # Example
//!
//! The in-memory stores used here come from [`helpers`], which is compiled
//! with the `helpers` feature.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use atrium_access::helpers::{MemoryFeatureAccessStore, MemoryIdentityStore, profile};
//! use atrium_access::{
//!     AccessResolver, AccessSettings, Identity, Role, RoleSet, SessionContext, Subject,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let settings = AccessSettings::default();
//! let identities = MemoryIdentityStore::default();
//! identities.sign_in(Identity::new("ada", "token-1"), Some(profile("ada", Role::Staff)));
//!
//! let features = MemoryFeatureAccessStore::default();
//! features.grant(Subject::Role(Role::Staff), "hr.attendance".parse().unwrap(), true);
//!
//! let session = SessionContext::new(Arc::new(identities), &settings);
//! let resolver = AccessResolver::new(session.clone(), Arc::new(features), &settings);
//!
//! session.initialize().await;
//!
//! assert!(resolver.has_role(&RoleSet::from([Role::Admin, Role::Staff])));
//! assert!(resolver.has_feature_access(&"hr.attendance".parse().unwrap()).await);
//! assert!(!resolver.has_feature_access(&"hr.payroll".parse().unwrap()).await);
//! # }
//! ```

mod sync;
pub use sync::*;

mod error;
pub use error::*;

mod role;
pub use role::*;

mod route;
pub use route::*;

mod identity;
pub use identity::*;

mod profile;
pub use profile::*;

mod feature;
pub use feature::*;

mod state;
pub use state::*;

mod settings;
pub use settings::*;

mod store;
pub use store::*;

mod session;
pub use session::*;

mod resolver;
pub use resolver::*;

mod navigator;
pub use navigator::*;

mod guard;
pub use guard::*;

mod redirect;
pub use redirect::*;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;
