//! Principals and Roles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as the auth service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

/// Access role resolved from the `user_roles` table.
///
/// Only `admin` unlocks editing. Every other role string, and a missing
/// row altogether, acts as a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Viewer
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        if raw == "admin" { Role::Admin } else { Role::Viewer }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_string_grants_admin() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("viewer"), Role::Viewer);
        assert_eq!(Role::from("moderator"), Role::Viewer);
        assert_eq!(Role::from(""), Role::Viewer);
    }

    #[test]
    fn test_role_serde_is_total() {
        let admin: Role = serde_json::from_str("\"admin\"").unwrap();
        assert!(admin.is_admin());

        let stray: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(stray, Role::Viewer);

        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
