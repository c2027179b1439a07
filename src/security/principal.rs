//! Resolved identities and their permission levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Departmental;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    User,
    Manager,
    Admin,
}

impl Permission {
    fn bit(self) -> u8 {
        match self {
            Permission::User => 0b001,
            Permission::Manager => 0b010,
            Permission::Admin => 0b100,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::User => write!(f, "user"),
            Permission::Manager => write!(f, "manager"),
            Permission::Admin => write!(f, "admin"),
        }
    }
}

/// Set of permissions a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet {
    bits: u8,
}

impl PermissionSet {
    pub fn of(permissions: &[Permission]) -> Self {
        Self {
            bits: permissions.iter().fold(0, |bits, p| bits | p.bit()),
        }
    }

    pub fn any() -> Self {
        Self::of(&[Permission::User, Permission::Manager, Permission::Admin])
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.bits & permission.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Identity resolved from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Principal {
    pub id: u64,
    pub name: String,
    pub permission: Permission,
    pub department: String,
}

impl Departmental for Principal {
    fn department(&self) -> &str {
        &self.department
    }
}
