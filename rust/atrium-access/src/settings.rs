use serde::{Deserialize, Serialize};

use crate::Route;

/// Upper bound on [`AccessSettings::profile_fetch_retries`].
pub const MAX_PROFILE_FETCH_RETRIES: u8 = 1;

/// Tunables shared by the session, resolver, guard and dispatcher.
///
/// Every field has a default, so a host only needs to spell out what it
/// changes:
///
/// ```
/// use atrium_access::AccessSettings;
///
/// let settings = AccessSettings::from_json(r#"{ "landing_route": "/welcome" }"#).unwrap();
/// assert_eq!(settings.landing_route.as_str(), "/welcome");
/// assert_eq!(settings.fallback_route.as_str(), "/dashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessSettings {
    /// Public landing page; anonymous users hitting a role-restricted route
    /// are sent here.
    pub landing_route: Route,
    /// Where an authenticated user whose role is not allowed on a route is
    /// sent.
    pub fallback_route: Route,
    /// Additional profile fetches after the first one fails.
    pub profile_fetch_retries: u8,
    /// Whether feature checks are cached for the lifetime of a session.
    pub cache_feature_checks: bool,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            landing_route: Route::home(),
            fallback_route: Route::dashboard(),
            profile_fetch_retries: MAX_PROFILE_FETCH_RETRIES,
            cache_feature_checks: true,
        }
    }
}

/// Error returned for unusable settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The document could not be parsed.
    #[error("Malformed access settings: {0}")]
    Malformed(#[from] serde_json::Error),

    /// More profile retries were requested than the session allows.
    #[error("profile_fetch_retries must be at most {MAX_PROFILE_FETCH_RETRIES}, got {0}")]
    TooManyRetries(u8),

    /// Landing and fallback routes are the same path, which would send
    /// anonymous and unauthorized users to the same place.
    #[error("landing_route and fallback_route must differ, both are '{0}'")]
    IndistinctRoutes(Route),
}

impl AccessSettings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: AccessSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that the type alone cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.profile_fetch_retries > MAX_PROFILE_FETCH_RETRIES {
            return Err(SettingsError::TooManyRetries(self.profile_fetch_retries));
        }
        if self.landing_route == self.fallback_route {
            return Err(SettingsError::IndistinctRoutes(self.landing_route.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_defaults_every_field() {
        let settings = AccessSettings::from_json("{}").unwrap();
        assert_eq!(settings, AccessSettings::default());
        assert_eq!(settings.profile_fetch_retries, 1);
        assert!(settings.cache_feature_checks);
    }

    #[test]
    fn it_rejects_unknown_fields() {
        let error = AccessSettings::from_json(r#"{ "landing": "/" }"#).unwrap_err();
        assert!(matches!(error, SettingsError::Malformed(_)));
    }

    #[test]
    fn it_rejects_relative_routes() {
        let error = AccessSettings::from_json(r#"{ "fallback_route": "dashboard" }"#).unwrap_err();
        assert!(matches!(error, SettingsError::Malformed(_)));
    }

    #[test]
    fn it_caps_profile_retries() {
        let error = AccessSettings::from_json(r#"{ "profile_fetch_retries": 3 }"#).unwrap_err();
        assert!(matches!(error, SettingsError::TooManyRetries(3)));

        let settings = AccessSettings::from_json(r#"{ "profile_fetch_retries": 0 }"#).unwrap();
        assert_eq!(settings.profile_fetch_retries, 0);
    }

    #[test]
    fn it_requires_distinct_landing_and_fallback_routes() {
        let error =
            AccessSettings::from_json(r#"{ "landing_route": "/dashboard" }"#).unwrap_err();
        assert!(matches!(error, SettingsError::IndistinctRoutes(route) if route == Route::dashboard()));
    }
}
