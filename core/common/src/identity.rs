//! Caller identity supplied by the authentication collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{FamilyId, UserId};

/// Membership role within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// Whether this role may create items and see every item of the family.
    pub fn can_manage_vault(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(crate::Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub family_id: FamilyId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, family_id: FamilyId, role: Role) -> Self {
        Self {
            user_id,
            family_id,
            role,
        }
    }

    /// Shorthand for `self.role.can_manage_vault()`.
    pub fn can_manage_vault(&self) -> bool {
        self.role.can_manage_vault()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manage_capability() {
        assert!(Role::Owner.can_manage_vault());
        assert!(Role::Admin.can_manage_vault());
        assert!(!Role::Member.can_manage_vault());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("member".parse::<Role>().unwrap(), Role::Member);
        assert!("parent".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let role: Role = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, Role::Owner);
    }
}
