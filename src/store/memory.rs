//! In-memory directory of users and inventory.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use futures_util::future::{self, FutureExt};

use crate::config::ConfigError;
use crate::security::principal::Principal;
use crate::store::model::{Fixtures, InventoryItem};
use crate::store::{CredentialStore, ResourceRepository, StoreFuture};

/// Thread-safe store backing the service.
///
/// Guards only read from it. Mutations happen in the business closures that
/// run after every guard allowed.
#[derive(Debug, Default)]
pub struct Directory {
    tokens: DashMap<String, u64>,
    users: DashMap<u64, Principal>,
    items: DashMap<u64, InventoryItem>,
    next_item_id: AtomicU64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Result<Self, ConfigError> {
        let directory = Self::new();
        for user in fixtures.users {
            directory.insert_user(&user.token, user.principal);
        }
        for item in fixtures.items {
            directory.insert_item(item)?;
        }
        tracing::info!(
            users = directory.users.len(),
            items = directory.items.len(),
            "Directory seeded"
        );
        Ok(directory)
    }

    /// Seed from a JSON fixtures file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_fixtures(Fixtures::from_json(&content)?)
    }

    pub fn insert_user(&self, token: &str, principal: Principal) {
        self.tokens.insert(token.to_string(), principal.id);
        self.users.insert(principal.id, principal);
    }

    pub fn user(&self, id: u64) -> Option<Principal> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    pub fn rename_user(&self, id: u64, name: String) -> Option<Principal> {
        self.users.get_mut(&id).map(|mut r| {
            r.name = name;
            r.value().clone()
        })
    }

    /// Store a seeded item. The id must leave room for one more.
    pub fn insert_item(&self, item: InventoryItem) -> Result<(), ConfigError> {
        let next = item.id.checked_add(1).ok_or_else(|| {
            ConfigError::InvalidFixture(format!("item id {} is out of range", item.id))
        })?;
        self.next_item_id.fetch_max(next, Ordering::SeqCst);
        self.items.insert(item.id, item);
        Ok(())
    }

    pub fn item(&self, id: u64) -> Option<InventoryItem> {
        self.items.get(&id).map(|r| r.value().clone())
    }

    /// Store a new item under the next free id. `None` once ids run out.
    pub fn create_item(&self, name: String, quantity: u32, department: String) -> Option<InventoryItem> {
        let id = self
            .next_item_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .ok()?;
        let item = InventoryItem {
            id,
            name,
            quantity,
            department,
            manifest_bytes: None,
        };
        self.items.insert(id, item.clone());
        Some(item)
    }

    /// Apply `f` to item `id`, returning the updated record.
    pub fn update_item(&self, id: u64, f: impl FnOnce(&mut InventoryItem)) -> Option<InventoryItem> {
        self.items.get_mut(&id).map(|mut r| {
            f(r.value_mut());
            r.value().clone()
        })
    }

    pub fn remove_item(&self, id: u64) -> Option<InventoryItem> {
        self.items.remove(&id).map(|(_, item)| item)
    }
}

impl CredentialStore for Directory {
    fn resolve_principal<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Principal>> {
        let principal = self
            .tokens
            .get(token)
            .and_then(|id| self.user(*id.value()));
        future::ready(Ok(principal)).boxed()
    }
}

impl ResourceRepository<InventoryItem> for Directory {
    fn find(&self, id: u64) -> StoreFuture<'_, Option<InventoryItem>> {
        future::ready(Ok(self.item(id))).boxed()
    }
}
