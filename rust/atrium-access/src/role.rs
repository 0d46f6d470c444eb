use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Route;

/// Authorization level carried by a [`Profile`](crate::Profile).
///
/// The set is closed: role strings coming out of a store are parsed with
/// [`Role::from_str`] at the store boundary, and anything unknown is
/// rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Console administrators.
    Admin,
    /// Department staff.
    Staff,
    /// Trainers running education programmes.
    Trainer,
    /// Enrolled students.
    Student,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Trainer, Role::Student];

    /// The lowercase name used in stores and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Trainer => "trainer",
            Role::Student => "student",
        }
    }

    /// The dashboard a user with this role lands on.
    pub fn dashboard_route(self) -> Route {
        Route::from_static(match self {
            Role::Admin => "/dashboard/admin",
            Role::Staff => "/dashboard/staff",
            Role::Trainer => "/dashboard/trainer",
            Role::Student => "/dashboard/student",
        })
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleParseError {
    /// The role string was empty.
    #[error("Role must not be empty")]
    Empty,

    /// The role string does not name a known role.
    #[error("Unknown role '{0}'")]
    Unknown(String),
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" => Err(RoleParseError::Empty),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "trainer" => Ok(Role::Trainer),
            "student" => Ok(Role::Student),
            other => Err(RoleParseError::Unknown(other.to_string())),
        }
    }
}

/// A set of [`Role`]s, used as the `allowed_roles` of a protected route.
///
/// ```
/// use atrium_access::{Role, RoleSet};
///
/// let staff_only = RoleSet::from([Role::Admin, Role::Staff]);
/// assert!(staff_only.contains(Role::Staff));
/// assert!(!staff_only.contains(Role::Student));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// A set with no roles. Guards using it redirect every authenticated user.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set with every role.
    pub fn all() -> Self {
        Role::ALL.into_iter().collect()
    }

    /// Add a role to the set.
    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    /// Return a copy of the set with `role` added.
    pub fn with(mut self, role: Role) -> Self {
        self.insert(role);
        self
    }

    /// Whether `role` is a member of the set.
    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of roles in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet::empty().with(role)
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl Display for RoleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (index, role) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_every_known_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn it_rejects_unknown_and_empty_roles() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(RoleParseError::Unknown("superuser".into()))
        );
        assert_eq!("".parse::<Role>(), Err(RoleParseError::Empty));
        // Role strings are taken verbatim at the store boundary
        assert!("Admin".parse::<Role>().is_err());
        assert_eq!(
            " admin ".parse::<Role>(),
            Err(RoleParseError::Unknown(" admin ".into()))
        );
    }

    #[test]
    fn it_maps_roles_to_fixed_dashboards() {
        assert_eq!(Role::Admin.dashboard_route().as_str(), "/dashboard/admin");
        assert_eq!(Role::Staff.dashboard_route().as_str(), "/dashboard/staff");
        assert_eq!(Role::Trainer.dashboard_route().as_str(), "/dashboard/trainer");
        assert_eq!(Role::Student.dashboard_route().as_str(), "/dashboard/student");
    }

    #[test]
    fn it_tracks_membership() {
        let mut set = RoleSet::empty();
        assert!(set.is_empty());

        set.insert(Role::Trainer);
        set.insert(Role::Trainer);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Role::Trainer));
        assert!(!set.contains(Role::Admin));

        let all = RoleSet::all();
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().collect::<Vec<_>>(), Role::ALL.to_vec());
    }

    #[test]
    fn it_deserializes_lowercase_role_names() {
        let role: Role = serde_json::from_str("\"trainer\"").unwrap();
        assert_eq!(role, Role::Trainer);
        assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    }

    #[test]
    fn it_displays_sets_in_declaration_order() {
        let set = RoleSet::from([Role::Student, Role::Admin]);
        assert_eq!(set.to_string(), "{admin, student}");
    }
}
