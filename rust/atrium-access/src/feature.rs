use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Role, UserId};

/// Attendance records (HR).
pub const HR_ATTENDANCE: &str = "hr.attendance";
/// Leave requests (HR).
pub const HR_LEAVE: &str = "hr.leave";
/// Payroll runs (HR).
pub const HR_PAYROLL: &str = "hr.payroll";
/// Course catalogue (education).
pub const EDUCATION_COURSES: &str = "education.courses";
/// Student enrollment (education).
pub const EDUCATION_ENROLLMENT: &str = "education.enrollment";
/// Incubated startups (incubation).
pub const INCUBATION_STARTUPS: &str = "incubation.startups";
/// Stock items (inventory).
pub const INVENTORY_ITEMS: &str = "inventory.items";
/// Job postings (job centre).
pub const JOBS_POSTINGS: &str = "jobs.postings";
/// Job applications (job centre).
pub const JOBS_APPLICATIONS: &str = "jobs.applications";

/// Feature keys for every department view in the console.
pub const FEATURE_CATALOG: &[&str] = &[
    HR_ATTENDANCE,
    HR_LEAVE,
    HR_PAYROLL,
    EDUCATION_COURSES,
    EDUCATION_ENROLLMENT,
    INCUBATION_STARTUPS,
    INVENTORY_ITEMS,
    JOBS_POSTINGS,
    JOBS_APPLICATIONS,
];

/// Name of a feature that can be granted per user or per role.
///
/// Keys are dot-separated segments of lowercase ASCII letters, digits and
/// underscores, e.g. `hr.payroll`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureKey(String);

/// Error returned for a malformed feature key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureKeyError {
    /// The key was empty.
    #[error("Feature key must not be empty")]
    Empty,

    /// A segment was empty or contained a disallowed character.
    #[error("Invalid segment '{segment}' in feature key '{key}'")]
    InvalidSegment {
        /// The full key.
        key: String,
        /// The offending segment.
        segment: String,
    },
}

impl FeatureKey {
    /// Validate and wrap a feature key.
    pub fn new(key: impl Into<String>) -> Result<Self, FeatureKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(FeatureKeyError::Empty);
        }

        for segment in key.split('.') {
            let valid = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !valid {
                return Err(FeatureKeyError::InvalidSegment {
                    segment: segment.to_string(),
                    key: key.clone(),
                });
            }
        }

        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FeatureKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FeatureKey {
    type Err = FeatureKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FeatureKey::new(value)
    }
}

impl TryFrom<String> for FeatureKey {
    type Error = FeatureKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FeatureKey::new(value)
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.0
    }
}

/// Who a grant applies to.
///
/// A user grant overrides the grant for that user's role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Subject {
    /// A single user.
    User(UserId),
    /// Every user holding a role.
    Role(Role),
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::User(user) => write!(f, "user:{user}"),
            Subject::Role(role) => write!(f, "role:{role}"),
        }
    }
}

/// A stored permission for one (subject, feature) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAccessGrant {
    /// Who the grant applies to.
    pub subject: Subject,
    /// The feature being granted or withheld.
    pub feature: FeatureKey,
    /// Whether the feature is enabled for the subject.
    pub granted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_entry_is_a_valid_key() {
        for key in FEATURE_CATALOG {
            FeatureKey::new(*key).unwrap();
        }
    }

    #[test]
    fn it_rejects_malformed_keys() {
        assert_eq!(FeatureKey::new(""), Err(FeatureKeyError::Empty));
        assert!(matches!(
            FeatureKey::new("hr..payroll"),
            Err(FeatureKeyError::InvalidSegment { segment, .. }) if segment.is_empty()
        ));
        assert!(FeatureKey::new("HR.payroll").is_err());
        assert!(FeatureKey::new("hr payroll").is_err());
        assert!(FeatureKey::new("hr.").is_err());
    }

    #[test]
    fn it_reads_grants_from_json() {
        let grant: FeatureAccessGrant = serde_json::from_str(
            r#"{ "subject": { "kind": "role", "id": "trainer" }, "feature": "education.courses", "granted": true }"#,
        )
        .unwrap();
        assert_eq!(grant.subject, Subject::Role(Role::Trainer));
        assert_eq!(grant.feature.as_str(), EDUCATION_COURSES);
        assert!(grant.granted);
    }

    #[test]
    fn it_displays_subjects() {
        assert_eq!(Subject::User(UserId::new("amir")).to_string(), "user:amir");
        assert_eq!(Subject::Role(Role::Staff).to_string(), "role:staff");
    }
}
