//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that addresses and header names parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::GateConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("auth.token_header must not be empty")]
    EmptyTokenHeader,

    #[error("auth.token_header {0:?} is not a valid header name")]
    InvalidTokenHeader(String),

    #[error("auth.lookup_timeout_ms must be greater than zero")]
    ZeroLookupTimeout,

    #[error("body.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let header = config.auth.token_header.trim();
    if header.is_empty() {
        errors.push(ValidationError::EmptyTokenHeader);
    } else if HeaderName::try_from(header).is_err() {
        errors.push(ValidationError::InvalidTokenHeader(header.to_string()));
    }

    if config.auth.lookup_timeout_ms == 0 {
        errors.push(ValidationError::ZeroLookupTimeout);
    }

    if config.body.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GateConfig::default();
        config.auth.token_header = "bad header".into();
        config.auth.lookup_timeout_ms = 0;
        config.body.max_body_size = 0;
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidTokenHeader("bad header".into())));
        assert!(errors.contains(&ValidationError::ZeroLookupTimeout));
        assert!(errors.contains(&ValidationError::ZeroBodyLimit));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GateConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "off".into();
        assert!(validate_config(&config).is_ok());
    }
}
