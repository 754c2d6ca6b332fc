//! Authenticated record model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Name of the collection holding administrative accounts
pub const SUPERUSERS_COLLECTION: &str = "_superusers";

/// A record returned by an auth endpoint.
///
/// Only the identifying fields are typed; everything else the backend sends
/// (email, verified flag, custom fields) is kept as-is in `fields` so that a
/// round trip through storage loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
}

impl AuthRecord {
    /// Create a record with no extra fields
    pub fn new(
        id: impl Into<String>,
        collection_id: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            collection_id: collection_id.into(),
            collection_name: collection_name.into(),
            fields: Map::new(),
        }
    }

    /// Whether this record belongs to the superusers collection
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.collection_name == SUPERUSERS_COLLECTION
    }

    /// Look up an untyped field
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Convenience accessor for the `email` field
    pub fn email(&self) -> Option<&str> {
        self.field("email").and_then(JsonValue::as_str)
    }
}
