//! Wire types shared by the client services

use pb_admin_core::AuthRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Body returned by every auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: AuthRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonValue>,
}

/// Password auth request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthWithPasswordRequest {
    pub identity: String,
    pub password: String,
}

/// Body of `POST /api/files/token`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTokenResponse {
    pub token: String,
}

/// Error body returned by the backend for non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    /// Field-level validation errors, keyed by field name
    #[serde(default)]
    pub data: Map<String, JsonValue>,
}

impl ErrorResponse {
    /// Build a response from a body that was not the usual JSON error shape
    pub fn from_body(status: u16, body: &str) -> Self {
        serde_json::from_str::<Self>(body).unwrap_or_else(|_| Self {
            code: status,
            message: body.trim().to_string(),
            data: Map::new(),
        })
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "status {}", self.code)
        } else {
            f.write_str(&self.message)
        }
    }
}
