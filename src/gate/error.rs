//! Denial taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::gate::reply::Reply;

/// Why a request was refused.
///
/// Every variant renders to a complete [`Reply`]; none of them escapes the
/// pipeline as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("No Security Token")]
    MissingCredential,

    #[error("Principal Not Found")]
    PrincipalNotFound,

    #[error("Insufficient Permission")]
    InsufficientPermission,

    #[error("Resource Not Found")]
    ResourceNotFound,

    #[error("Forbidden")]
    OwnershipMismatch,

    #[error("Bad Request: {0}")]
    BodyDecodeFailure(String),

    #[error("Unexpected Request Body")]
    UnexpectedBody,

    #[error("Payload Too Large")]
    BodyTooLarge,

    #[error("Service Unavailable")]
    LookupUnavailable,

    #[error("Gateway Timeout")]
    LookupTimeout,
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::MissingCredential => StatusCode::UNAUTHORIZED,
            AccessError::PrincipalNotFound | AccessError::ResourceNotFound => {
                StatusCode::NOT_FOUND
            }
            AccessError::InsufficientPermission | AccessError::OwnershipMismatch => {
                StatusCode::FORBIDDEN
            }
            AccessError::BodyDecodeFailure(_) | AccessError::UnexpectedBody => {
                StatusCode::BAD_REQUEST
            }
            AccessError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AccessError::LookupUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AccessError::LookupTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AccessError::MissingCredential => "missing_credential",
            AccessError::PrincipalNotFound => "principal_not_found",
            AccessError::InsufficientPermission => "insufficient_permission",
            AccessError::ResourceNotFound => "resource_not_found",
            AccessError::OwnershipMismatch => "ownership_mismatch",
            AccessError::BodyDecodeFailure(_) => "body_decode_failure",
            AccessError::UnexpectedBody => "unexpected_body",
            AccessError::BodyTooLarge => "body_too_large",
            AccessError::LookupUnavailable => "lookup_unavailable",
            AccessError::LookupTimeout => "lookup_timeout",
        }
    }
}

impl From<AccessError> for Reply {
    fn from(err: AccessError) -> Self {
        Reply::text(err.status(), err.to_string())
    }
}
