//! Client error types

use crate::types::ErrorResponse;
use pb_admin_core::CoreError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request was cancelled before it completed
    #[error("The request was aborted")]
    Aborted,

    /// Bad request, usually with field-level validation data
    #[error("Bad request: {0}")]
    BadRequest(ErrorResponse),

    /// Missing or expired credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ErrorResponse),

    /// Credentials lack permission for the resource
    #[error("Forbidden: {0}")]
    Forbidden(ErrorResponse),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(ErrorResponse),

    /// Server returned any other error status
    #[error("Server error {status}: {response}")]
    ServerError { status: u16, response: ErrorResponse },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisting credentials failed
    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and the decoded error body
    pub fn from_status(status: reqwest::StatusCode, response: ErrorResponse) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(response),
            401 => Self::AuthenticationFailed(response),
            403 => Self::Forbidden(response),
            404 => Self::NotFound(response),
            status => Self::ServerError { status, response },
        }
    }

    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Decoded error body, if the server answered with one
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::BadRequest(response)
            | Self::AuthenticationFailed(response)
            | Self::Forbidden(response)
            | Self::NotFound(response)
            | Self::ServerError { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Whether the request was cancelled rather than failed
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Whether the credentials were rejected
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, ErrorResponse::default());
        assert!(err.is_auth_expired());
        assert_eq!(err.status(), Some(401));

        let err = ClientError::from_status(StatusCode::FORBIDDEN, ErrorResponse::default());
        assert!(matches!(err, ClientError::Forbidden(_)));

        let err = ClientError::from_status(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorResponse::from_body(429, "slow down"),
        );
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.response().map(|r| r.message.as_str()), Some("slow down"));
        assert_eq!(err.to_string(), "Server error 429: slow down");
    }

    #[test]
    fn test_errors_without_response() {
        assert!(ClientError::Aborted.is_abort());
        assert_eq!(ClientError::Aborted.status(), None);
        assert!(ClientError::Configuration("x".into()).response().is_none());
    }
}
