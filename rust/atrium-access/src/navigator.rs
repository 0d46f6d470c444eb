use crate::Route;

/// Performs navigation on behalf of guards and the redirect dispatcher.
///
/// The rendering layer supplies the implementation (a router handle in the
/// console, a recorder in tests). Any `Fn(&Route)` closure is a navigator.
pub trait Navigator {
    /// Replace the current location with `route`.
    fn navigate(&self, route: &Route);
}

impl<F> Navigator for F
where
    F: Fn(&Route),
{
    fn navigate(&self, route: &Route) {
        self(route)
    }
}
