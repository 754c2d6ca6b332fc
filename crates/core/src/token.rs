//! Bearer token inspection
//!
//! Tokens are JWTs. Only the payload segment is decoded, and only to read the
//! `exp` claim: signature checks belong to the backend.

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::{Map, Value as JsonValue};

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the claims of a JWT.
///
/// Returns an empty map for anything that is not a well formed token.
pub fn token_payload(token: &str) -> Map<String, JsonValue> {
    let Some(segment) = token.split('.').nth(1) else {
        return Map::new();
    };

    PAYLOAD_ENGINE
        .decode(segment)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<JsonValue>(&bytes).ok())
        .and_then(|value| match value {
            JsonValue::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

/// Check whether a token is expired, or will be within `threshold_secs`.
///
/// A token whose payload cannot be read counts as expired. A readable payload
/// without an `exp` claim never expires.
pub fn is_token_expired(token: &str, threshold_secs: i64) -> bool {
    is_token_expired_at(token, threshold_secs, chrono::Utc::now().timestamp())
}

/// [`is_token_expired`] against an explicit unix timestamp
pub fn is_token_expired_at(token: &str, threshold_secs: i64, now: i64) -> bool {
    let payload = token_payload(token);
    if payload.is_empty() {
        return true;
    }

    match payload.get("exp").and_then(JsonValue::as_f64) {
        Some(exp) => exp - threshold_secs as f64 <= now as f64,
        None => false,
    }
}
