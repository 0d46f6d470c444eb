use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ProfileFetchError, Role, UserId};

/// Account status recorded on a profile.
///
/// Carried for display; access decisions are made on [`Role`] alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    /// A working account.
    #[default]
    Active,
    /// An account that has been switched off by an administrator.
    Inactive,
}

impl ProfileStatus {
    /// The lowercase name used in stores.
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileStatus::Active => "active",
            ProfileStatus::Inactive => "inactive",
        }
    }
}

impl Display for ProfileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileStatus {
    type Err = ProfileFetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(ProfileStatus::Active),
            "inactive" => Ok(ProfileStatus::Inactive),
            other => Err(ProfileFetchError::InvalidStatus(other.to_string())),
        }
    }
}

/// The role-bearing record attached to an [`Identity`](crate::Identity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The user this profile belongs to.
    pub id: UserId,
    /// Authorization level.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Contact address.
    pub email: String,
    /// Account status.
    #[serde(default)]
    pub status: ProfileStatus,
}

/// A profile as a document store hands it back, with untyped role and
/// status fields.
///
/// Store implementations convert it with `Profile::try_from`, which is where
/// unknown roles are rejected.
///
/// ```
/// use atrium_access::{Profile, ProfileFetchError, ProfileRecord, Role};
///
/// let record = ProfileRecord {
///     id: "lin".into(),
///     role: "trainer".into(),
///     full_name: "Lin Okafor".into(),
///     email: "lin@example.org".into(),
///     status: None,
/// };
/// assert_eq!(Profile::try_from(record).unwrap().role, Role::Trainer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// User id.
    pub id: String,
    /// Role name.
    pub role: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Contact address.
    #[serde(default)]
    pub email: String,
    /// Status name; absent means active.
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = ProfileFetchError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let role = record.role.parse::<Role>()?;
        let status = match record.status.as_deref() {
            None => ProfileStatus::default(),
            Some(status) => status.parse()?,
        };

        Ok(Profile {
            id: UserId::new(record.id),
            role,
            full_name: record.full_name,
            email: record.email,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleParseError;

    fn record(role: &str, status: Option<&str>) -> ProfileRecord {
        ProfileRecord {
            id: "noor".into(),
            role: role.into(),
            full_name: "Noor Haddad".into(),
            email: "noor@example.org".into(),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn it_converts_a_well_formed_record() {
        let profile = Profile::try_from(record("staff", Some("inactive"))).unwrap();
        assert_eq!(profile.id, UserId::new("noor"));
        assert_eq!(profile.role, Role::Staff);
        assert_eq!(profile.status, ProfileStatus::Inactive);
    }

    #[test]
    fn it_rejects_unknown_roles_at_the_boundary() {
        let error = Profile::try_from(record("manager", None)).unwrap_err();
        assert_eq!(
            error,
            ProfileFetchError::InvalidRole(RoleParseError::Unknown("manager".into()))
        );
    }

    #[test]
    fn it_rejects_unknown_statuses() {
        let error = Profile::try_from(record("student", Some("banned"))).unwrap_err();
        assert_eq!(error, ProfileFetchError::InvalidStatus("banned".into()));
    }

    #[test]
    fn it_reads_records_from_json() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{ "id": "kai", "role": "admin" }"#).unwrap();
        let profile = Profile::try_from(record).unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(profile.status, ProfileStatus::Active);
        assert!(profile.full_name.is_empty());
    }
}
