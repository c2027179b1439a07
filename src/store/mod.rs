//! Lookup interfaces the guards consult.
//!
//! # Data Flow
//! ```text
//! TokenGuard → CredentialStore::resolve_principal(token)
//!            → ResourceRepository::find(id)
//! ```
//!
//! # Design Decisions
//! - Read-only from the guards' point of view
//! - Faults are `StoreError`; guards translate them into denials
//! - `memory.rs` is the in-process implementation used by the service

pub mod memory;
pub mod model;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::security::principal::Principal;

pub use memory::Directory;
pub use model::{Fixtures, InventoryItem, UserFixture};

/// Failure of an external lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store lookup timed out")]
    Timeout,
}

pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Maps a secret token to the principal it belongs to.
pub trait CredentialStore: Send + Sync {
    fn resolve_principal<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Principal>>;
}

/// Finds resources by id.
pub trait ResourceRepository<R>: Send + Sync {
    fn find(&self, id: u64) -> StoreFuture<'_, Option<R>>;
}

/// Resources whose access is scoped to a department.
pub trait Departmental {
    fn department(&self) -> &str;
}
