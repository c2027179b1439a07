//! Resource-level checks on an already permitted principal.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, FutureExt};

use crate::gate::{AccessError, Guard, GuardFuture, GuardOutcome, HeaderView};
use crate::security::principal::Principal;
use crate::security::{deny, lookup};
use crate::store::{Departmental, ResourceRepository};

/// Id taken from the request path. Parsed up front but only judged once the
/// permission check has passed, so a malformed id never outranks a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetId(Option<u64>);

impl TargetId {
    pub fn new(id: u64) -> Self {
        Self(Some(id))
    }

    /// Anything that is not a decimal `u64` names no record.
    pub fn parse(raw: &str) -> Self {
        Self(raw.parse().ok())
    }

    pub fn get(&self) -> Option<u64> {
        self.0
    }
}

/// Principal may only act on their own user record.
pub struct SelfAccess {
    principal: Principal,
    target: TargetId,
}

impl SelfAccess {
    pub fn new(principal: Principal, target: TargetId) -> Self {
        Self { principal, target }
    }
}

impl Guard for SelfAccess {
    type Output = Principal;

    fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, Principal> {
        let outcome = if self.target.get() == Some(self.principal.id) {
            GuardOutcome::Allow(self.principal.clone())
        } else {
            tracing::debug!(principal = self.principal.id, target = ?self.target.get(), "Self access refused");
            deny(AccessError::OwnershipMismatch)
        };
        future::ready(outcome).boxed()
    }
}

/// Context after a successful ownership check.
#[derive(Debug, Clone)]
pub struct Owned<R> {
    pub principal: Principal,
    pub resource: R,
}

/// Resource must exist (404) and belong to the principal's department (403).
pub struct ResourceOwnership<R> {
    repository: Arc<dyn ResourceRepository<R>>,
    id: TargetId,
    principal: Principal,
    timeout: Duration,
}

impl<R> ResourceOwnership<R> {
    pub fn new(
        repository: Arc<dyn ResourceRepository<R>>,
        id: TargetId,
        principal: Principal,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            id,
            principal,
            timeout,
        }
    }
}

impl<R> Guard for ResourceOwnership<R>
where
    R: Departmental + Send + Sync + 'static,
{
    type Output = Owned<R>;

    fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, Owned<R>> {
        async move {
            let Some(id) = self.id.get() else {
                return deny(AccessError::ResourceNotFound);
            };
            match lookup("resource", self.timeout, self.repository.find(id)).await {
                Ok(Some(resource)) if resource.department() == self.principal.department() => {
                    GuardOutcome::Allow(Owned {
                        principal: self.principal.clone(),
                        resource,
                    })
                }
                Ok(Some(resource)) => {
                    tracing::debug!(
                        principal = self.principal.id,
                        resource = id,
                        department = resource.department(),
                        "Department mismatch"
                    );
                    deny(AccessError::OwnershipMismatch)
                }
                Ok(None) => deny(AccessError::ResourceNotFound),
                Err(err) => deny(err),
            }
        }
        .boxed()
    }
}
