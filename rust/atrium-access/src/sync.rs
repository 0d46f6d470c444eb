//! Thread-safety bound that depends on the compilation target.
//!
//! Browser-backed stores hold JS handles that are neither `Send` nor `Sync`,
//! while native hosts may share a session across a multi-threaded runtime.
//! The store traits are bounded by [`ConditionalSync`] instead of
//! `Send + Sync` directly: on native targets it means `Send + Sync`, on
//! `wasm32` it means nothing.

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> ConditionalSync for T where T: Send + Sync + ?Sized {}

/// `Send + Sync` on native targets, no bound on `wasm32`.
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<T> ConditionalSync for T where T: ?Sized {}
