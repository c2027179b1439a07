//! Principal resolution and permission level check.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::FutureExt;

use crate::gate::{AccessError, Guard, GuardFuture, GuardOutcome, HeaderView};
use crate::security::principal::{PermissionSet, Principal};
use crate::security::token::Token;
use crate::security::{deny, lookup};
use crate::store::CredentialStore;

/// Second layer of the permission chain: resolves an already extracted
/// token. Built by `bind` from the token guard's output; it does not look at
/// the header itself.
pub struct ResolvePrincipal {
    credentials: Arc<dyn CredentialStore>,
    token: Token,
    allowed: PermissionSet,
    timeout: Duration,
}

impl ResolvePrincipal {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        token: Token,
        allowed: PermissionSet,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            token,
            allowed,
            timeout,
        }
    }
}

impl Guard for ResolvePrincipal {
    type Output = Principal;

    fn evaluate<'a>(&'a self, _header: &'a HeaderView) -> GuardFuture<'a, Principal> {
        async move {
            let found = lookup(
                "principal",
                self.timeout,
                self.credentials.resolve_principal(self.token.as_str()),
            )
            .await;

            match found {
                Ok(Some(principal)) if self.allowed.contains(principal.permission) => {
                    GuardOutcome::Allow(principal)
                }
                Ok(Some(principal)) => {
                    tracing::debug!(
                        principal = principal.id,
                        permission = %principal.permission,
                        "Permission not in allowed set"
                    );
                    deny(AccessError::InsufficientPermission)
                }
                Ok(None) => deny(AccessError::PrincipalNotFound),
                Err(err) => deny(err),
            }
        }
        .boxed()
    }
}
