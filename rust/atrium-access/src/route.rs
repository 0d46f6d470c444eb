use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Path of the public landing page.
pub const HOME_PATH: &str = "/";

/// Path of the generic, role-agnostic dashboard.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A normalized, absolute navigation path.
///
/// [`Route::parse`] drops any query string or fragment and a trailing
/// slash, so `/dashboard/?tab=1` and `/dashboard` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

/// Error returned when a path cannot be used as a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The path was empty.
    #[error("Route must not be empty")]
    Empty,

    /// The path did not start with `/`.
    #[error("Route must be an absolute path, got '{0}'")]
    Relative(String),
}

impl Route {
    /// Parse and normalize a path.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(RouteError::Empty);
        }

        let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
        let path = &trimmed[..end];
        if !path.starts_with('/') {
            return Err(RouteError::Relative(trimmed.to_string()));
        }

        let normalized = path.trim_end_matches('/');
        if normalized.is_empty() {
            Ok(Self::home())
        } else {
            Ok(Self(normalized.to_string()))
        }
    }

    pub(crate) fn from_static(path: &'static str) -> Self {
        Self(path.to_string())
    }

    /// The public landing page, `/`.
    pub fn home() -> Self {
        Self::from_static(HOME_PATH)
    }

    /// The generic dashboard, `/dashboard`.
    pub fn dashboard() -> Self {
        Self::from_static(DASHBOARD_PATH)
    }

    /// The normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a generic entry point that authenticated users are
    /// sent on from to their role dashboard.
    pub fn is_entry_point(&self) -> bool {
        self.0 == HOME_PATH || self.0 == DASHBOARD_PATH
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Route::parse(value)
    }
}

impl TryFrom<String> for Route {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Route::parse(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_normalizes_paths() {
        assert_eq!(Route::parse("/dashboard/").unwrap(), Route::dashboard());
        assert_eq!(Route::parse("/dashboard?tab=hr").unwrap(), Route::dashboard());
        assert_eq!(Route::parse(" /dashboard#top ").unwrap(), Route::dashboard());
        assert_eq!(Route::parse("///").unwrap(), Route::home());
        assert_eq!(
            Route::parse("/inventory/items/").unwrap().as_str(),
            "/inventory/items"
        );
    }

    #[test]
    fn it_rejects_relative_and_empty_paths() {
        assert_eq!(Route::parse(""), Err(RouteError::Empty));
        assert_eq!(
            Route::parse("dashboard"),
            Err(RouteError::Relative("dashboard".into()))
        );
        assert!(Route::parse("?next=/").is_err());
    }

    #[test]
    fn it_recognizes_entry_points() {
        assert!(Route::home().is_entry_point());
        assert!(Route::dashboard().is_entry_point());
        assert!(!Route::parse("/dashboard/admin").unwrap().is_entry_point());
        assert!(!Route::parse("/jobs").unwrap().is_entry_point());
    }

    #[test]
    fn it_round_trips_through_serde_with_validation() {
        let route: Route = serde_json::from_str("\"/hr/payroll/\"").unwrap();
        assert_eq!(route.as_str(), "/hr/payroll");
        assert!(serde_json::from_str::<Route>("\"hr/payroll\"").is_err());
    }
}
