use atrium_access::FeatureKey;
use leptos::prelude::*;

use super::use_session;

/// Renders `children` once the current user is allowed `feature`, and
/// `fallback` until then.
///
/// The check is repeated on every session transition. A lookup that
/// finishes after a newer transition is ignored.
#[component]
pub fn FeatureGate(
    /// The feature the children need.
    #[prop(into)]
    feature: FeatureKey,
    /// Shown while the check is pending or denied.
    #[prop(optional, into)]
    fallback: ViewFn,
    children: ChildrenFn,
) -> impl IntoView {
    let session = use_session();
    let allowed = RwSignal::new(false);
    let generation = StoredValue::new(0u64);

    Effect::new(move |_| {
        let authenticated = session.state.with(|state| state.profile().is_some());
        generation.update_value(|generation| *generation += 1);
        allowed.set(false);

        if !authenticated {
            return;
        }

        #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
        {
            let resolver = session.resolver();
            let feature = feature.clone();
            let issued = generation.get_value();
            wasm_bindgen_futures::spawn_local(async move {
                let granted = resolver.has_feature_access(&feature).await;
                settle(generation, allowed, issued, granted);
            });
        }

        #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
        tracing::debug!(%feature, "Feature checks only run in the browser");
    });

    move || {
        if allowed.get() {
            children().into_any()
        } else {
            fallback.run()
        }
    }
}

/// Publish the answer of lookup `issued` unless a newer one has started or
/// the gate has been unmounted. Returns whether `allowed` was written.
#[cfg_attr(
    not(all(target_arch = "wasm32", target_os = "unknown")),
    allow(dead_code)
)]
fn settle(
    generation: StoredValue<u64>,
    allowed: RwSignal<bool>,
    issued: u64,
    granted: bool,
) -> bool {
    if generation.try_get_value() != Some(issued) {
        return false;
    }
    allowed.try_set(granted).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_publishes_the_current_lookup() {
        let owner = Owner::new();
        owner.set();

        let generation = StoredValue::new(2u64);
        let allowed = RwSignal::new(false);

        assert!(!settle(generation, allowed, 1, true));
        assert!(!allowed.get_untracked());

        assert!(settle(generation, allowed, 2, true));
        assert!(allowed.get_untracked());
    }

    #[test]
    fn it_drops_answers_that_arrive_after_unmount() {
        let owner = Owner::new();
        owner.set();

        let generation = StoredValue::new(1u64);
        let allowed = RwSignal::new(false);
        owner.cleanup();

        assert!(!settle(generation, allowed, 1, true));
        assert!(allowed.try_get_untracked().is_none());
    }
}
