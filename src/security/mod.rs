//! Concrete guard library.
//!
//! # Data Flow
//! ```text
//! Incoming request head:
//!     → token.rs (X-SECRET-TOKEN present?)            401
//!     → permission.rs (token → principal, level ok?)  404 / 403
//!     → ownership.rs (self access or department)      403 / 404 / 403
//!     → handler context
//! ```
//!
//! # Design Decisions
//! - Every layer is built with `bind`; no layer knows about the next one
//! - Store faults and timeouts become 503 / 504 at the guard boundary
//! - Fail closed: any failed check denies

pub mod ownership;
pub mod permission;
pub mod principal;
pub mod token;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::InvalidHeaderName;

use crate::config::AuthConfig;
use crate::gate::{AccessError, Guard, GuardExt, GuardOutcome};
use crate::observability::metrics;
use crate::store::{CredentialStore, Departmental, ResourceRepository, StoreError};

pub use ownership::{Owned, ResourceOwnership, SelfAccess, TargetId};
pub use permission::ResolvePrincipal;
pub use principal::{Permission, PermissionSet, Principal};
pub use token::{Token, TokenGuard, SECRET_TOKEN_HEADER};

/// Deny with `err`, logging and counting the reason.
pub(crate) fn deny<T>(err: AccessError) -> GuardOutcome<T> {
    tracing::debug!(reason = err.reason(), status = err.status().as_u16(), "Guard denied");
    metrics::record_denial(err.reason());
    GuardOutcome::deny(err)
}

/// Run a store lookup under `timeout`, translating faults into denials.
pub(crate) async fn lookup<T, Fut>(
    what: &'static str,
    timeout: Duration,
    fut: Fut,
) -> Result<Option<T>, AccessError>
where
    Fut: Future<Output = Result<Option<T>, StoreError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(found)) => Ok(found),
        Ok(Err(StoreError::Timeout)) | Err(_) => {
            tracing::warn!(lookup = what, timeout_ms = timeout.as_millis() as u64, "Store lookup timed out");
            Err(AccessError::LookupTimeout)
        }
        Ok(Err(e)) => {
            tracing::warn!(lookup = what, error = %e, "Store lookup failed");
            Err(AccessError::LookupUnavailable)
        }
    }
}

/// Builds the standard guard chains against one credential store.
#[derive(Clone)]
pub struct AuthGuards {
    tokens: TokenGuard,
    credentials: Arc<dyn CredentialStore>,
    lookup_timeout: Duration,
}

impl AuthGuards {
    pub fn new(tokens: TokenGuard, credentials: Arc<dyn CredentialStore>, lookup_timeout: Duration) -> Self {
        Self {
            tokens,
            credentials,
            lookup_timeout,
        }
    }

    pub fn from_config(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, InvalidHeaderName> {
        Ok(Self::new(
            TokenGuard::named(&config.token_header)?,
            credentials,
            config.lookup_timeout(),
        ))
    }

    /// Credential header only.
    pub fn token(&self) -> TokenGuard {
        self.tokens.clone()
    }

    /// Token, then principal with a permission in `allowed`.
    pub fn permission(&self, allowed: PermissionSet) -> impl Guard<Output = Principal> {
        let credentials = self.credentials.clone();
        let timeout = self.lookup_timeout;
        self.token()
            .and_then(move |token| ResolvePrincipal::new(credentials.clone(), token, allowed, timeout))
    }

    /// Permission check, then the principal must be user `id`.
    pub fn self_access(&self, allowed: PermissionSet, id: TargetId) -> impl Guard<Output = Principal> {
        self.permission(allowed)
            .and_then(move |principal| SelfAccess::new(principal, id))
    }

    /// Permission check, then resource `id` must exist and share the
    /// principal's department.
    pub fn ownership<R>(
        &self,
        allowed: PermissionSet,
        repository: Arc<dyn ResourceRepository<R>>,
        id: TargetId,
    ) -> impl Guard<Output = Owned<R>>
    where
        R: Departmental + Send + Sync + 'static,
    {
        let timeout = self.lookup_timeout;
        self.permission(allowed).and_then(move |principal| {
            ResourceOwnership::new(repository.clone(), id, principal, timeout)
        })
    }
}
