//! Credential presence check.

use std::fmt;

use axum::http::{header::InvalidHeaderName, HeaderName};
use futures_util::future::{self, FutureExt};

use crate::gate::{AccessError, Guard, GuardFuture, GuardOutcome, HeaderView};
use crate::security::deny;

pub const SECRET_TOKEN_HEADER: &str = "x-secret-token";

/// Secret token taken from the request head.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Allows with the token found in the credential header, denies with 401
/// when the header is missing, empty or not readable as text.
#[derive(Debug, Clone)]
pub struct TokenGuard {
    header: HeaderName,
}

impl TokenGuard {
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static(SECRET_TOKEN_HEADER),
        }
    }

    /// Read the token from a different header.
    pub fn named(header: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::try_from(header.trim())?,
        })
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for TokenGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Guard for TokenGuard {
    type Output = Token;

    fn evaluate<'a>(&'a self, header: &'a HeaderView) -> GuardFuture<'a, Token> {
        let token = header
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let outcome = match token {
            Some(token) => GuardOutcome::Allow(Token(token.to_string())),
            None => deny(AccessError::MissingCredential),
        };
        future::ready(outcome).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};

    fn view(headers: &[(&'static str, &'static str)]) -> HeaderView {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(*k, HeaderValue::from_static(v));
        }
        HeaderView::new(Method::GET, "/users/42", map)
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        match TokenGuard::new().evaluate(&view(&[])).await {
            GuardOutcome::Deny(reply) => {
                assert_eq!(reply.status(), StatusCode::UNAUTHORIZED);
                assert_eq!(reply.body_text(), "No Security Token");
            }
            GuardOutcome::Allow(_) => panic!("missing token must deny"),
        }
    }

    #[tokio::test]
    async fn test_blank_token_is_401() {
        let outcome = TokenGuard::new()
            .evaluate(&view(&[("x-secret-token", "   ")]))
            .await;
        assert!(!outcome.is_allow());
    }

    #[tokio::test]
    async fn test_token_allowed() {
        let outcome = TokenGuard::new()
            .evaluate(&view(&[("x-secret-token", "secret-123")]))
            .await;
        assert_eq!(outcome.into_result().unwrap().as_str(), "secret-123");
    }

    #[tokio::test]
    async fn test_custom_header() {
        let guard = TokenGuard::named("X-Api-Key").unwrap();
        assert!(!guard
            .evaluate(&view(&[("x-secret-token", "secret-123")]))
            .await
            .is_allow());
        assert!(guard.evaluate(&view(&[("x-api-key", "k")])).await.is_allow());
        assert!(TokenGuard::named("bad header").is_err());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token("secret-123".into());
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
