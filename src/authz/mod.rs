//! Authorization module - permission model and request gate
//!
//! This module implements the fixed role matrix used by every resource:
//! - A closed set of roles, strings only at the serialization boundary
//! - Capabilities derived by pure lookup, never stored per user
//! - A gate that turns a missing capability into 401/403 before any work runs

mod gate;
mod principal;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use gate::{
    authorize, Authorized, CanCreate, CanDelete, CanEdit, CanManageUsers, Denial, Requirement,
};
pub use principal::Caller;

/// Account role. Immutable once assigned to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "kebab-case", try_from = "String")]
#[sqlx(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Manager,
    Technician,
    ExtensionAgent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Technician, Role::ExtensionAgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
            Role::ExtensionAgent => "extension-agent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Manager => "Gestor",
            Role::Technician => "Técnico de Campo",
            Role::ExtensionAgent => "Extensionista Rural",
        }
    }

    pub fn capabilities(self) -> CapabilitySet {
        match self {
            Role::Admin => CapabilitySet {
                create: true,
                edit: true,
                delete: true,
                manage_users: true,
            },
            Role::Manager => CapabilitySet {
                create: true,
                edit: true,
                delete: false,
                manage_users: false,
            },
            Role::Technician => CapabilitySet {
                create: true,
                edit: false,
                delete: false,
                manage_users: false,
            },
            Role::ExtensionAgent => CapabilitySet::default(),
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| InvalidRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = InvalidRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Unit of authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Create,
    Edit,
    Delete,
    ManageUsers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::ManageUsers => "manage-users",
        }
    }
}

/// Fixed boolean vector over the four capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub manage_users: bool,
}

impl CapabilitySet {
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::ManageUsers => self.manage_users,
        }
    }
}

/// Roles holding `capability`, in declaration order.
pub fn roles_with(capability: Capability) -> Vec<Role> {
    Role::ALL.into_iter().filter(|role| role.can(capability)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(role: Role) -> [bool; 4] {
        let set = role.capabilities();
        [set.create, set.edit, set.delete, set.manage_users]
    }

    #[test]
    fn capability_table_is_exact() {
        assert_eq!(vector(Role::Admin), [true, true, true, true]);
        assert_eq!(vector(Role::Manager), [true, true, false, false]);
        assert_eq!(vector(Role::Technician), [true, false, false, false]);
        assert_eq!(vector(Role::ExtensionAgent), [false, false, false, false]);
    }

    #[test]
    fn can_agrees_with_capability_set() {
        let all = [Capability::Create, Capability::Edit, Capability::Delete, Capability::ManageUsers];
        for role in Role::ALL {
            for capability in all {
                assert_eq!(role.can(capability), role.capabilities().contains(capability));
            }
        }
    }

    #[test]
    fn roles_with_lists_holders_in_order() {
        assert_eq!(
            roles_with(Capability::Create),
            vec![Role::Admin, Role::Manager, Role::Technician]
        );
        assert_eq!(roles_with(Capability::Edit), vec![Role::Admin, Role::Manager]);
        assert_eq!(roles_with(Capability::Delete), vec![Role::Admin]);
        assert_eq!(roles_with(Capability::ManageUsers), vec![Role::Admin]);
    }

    #[test]
    fn wire_strings_round_trip() {
        for role in Role::ALL {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(serde_json::from_value::<Role>(json).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_string_is_rejected() {
        assert_eq!("gestor".parse::<Role>(), Err(InvalidRole("gestor".to_string())));
        let err = serde_json::from_str::<Role>("\"superuser\"").unwrap_err();
        assert_eq!(err.to_string(), "invalid role: superuser");
        assert!(serde_json::from_str::<Role>("\"Admin\"").is_err());
    }
}
