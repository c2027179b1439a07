//! Records kept by the in-memory directory.

use serde::{Deserialize, Serialize};

use crate::security::principal::{Permission, Principal};
use crate::store::Departmental;

/// A stock record, scoped to the department that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub quantity: u32,
    pub department: String,
    /// Size of the last uploaded manifest, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_bytes: Option<u64>,
}

impl Departmental for InventoryItem {
    fn department(&self) -> &str {
        &self.department
    }
}

/// A user together with the token that authenticates them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserFixture {
    pub token: String,
    #[serde(flatten)]
    pub principal: Principal,
}

/// Seed data for the directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Fixtures {
    pub users: Vec<UserFixture>,
    pub items: Vec<InventoryItem>,
}

impl Fixtures {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Small data set for local runs.
    pub fn demo() -> Self {
        let user = |token: &str, id, name: &str, permission, department: &str| UserFixture {
            token: token.to_string(),
            principal: Principal {
                id,
                name: name.to_string(),
                permission,
                department: department.to_string(),
            },
        };
        let item = |id, name: &str, quantity, department: &str| InventoryItem {
            id,
            name: name.to_string(),
            quantity,
            department: department.to_string(),
            manifest_bytes: None,
        };

        Self {
            users: vec![
                user("secret-123", 42, "ada", Permission::User, "hardware"),
                user("secret-456", 7, "grace", Permission::Manager, "hardware"),
                user("secret-789", 1, "root", Permission::Admin, "hardware"),
                user("secret-000", 8, "linus", Permission::Manager, "garden"),
            ],
            items: vec![
                item(100, "hammer", 12, "hardware"),
                item(101, "wrench", 4, "hardware"),
                item(200, "rake", 9, "garden"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_from_json() {
        let fixtures = Fixtures::from_json(
            r#"{
                "users": [
                    { "token": "t", "id": 5, "name": "eve", "permission": "admin", "department": "ops" }
                ],
                "items": [
                    { "id": 9, "name": "drill", "quantity": 1, "department": "ops" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(fixtures.users[0].principal.permission, Permission::Admin);
        assert_eq!(fixtures.items[0].manifest_bytes, None);
    }

    #[test]
    fn test_demo_has_scenario_user() {
        let demo = Fixtures::demo();
        let ada = demo.users.iter().find(|u| u.token == "secret-123").unwrap();
        assert_eq!(ada.principal.id, 42);
        assert_eq!(ada.principal.permission, Permission::User);
    }
}
