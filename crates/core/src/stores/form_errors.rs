//! Field-level validation errors reported by the backend

use super::Writable;
use serde_json::{Map, Value as JsonValue};

/// Validation errors keyed by form field name
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    inner: Writable<Map<String, JsonValue>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all errors with the backend's `data` object
    pub fn set_errors(&self, errors: Map<String, JsonValue>) {
        self.inner.set(errors);
    }

    pub fn clear(&self) {
        self.inner.set(Map::new());
    }

    pub fn get(&self, field: &str) -> Option<JsonValue> {
        self.inner.with(|errors| errors.get(field).cloned())
    }

    pub fn snapshot(&self) -> Map<String, JsonValue> {
        self.inner.get()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.with(Map::is_empty)
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Map<String, JsonValue>> {
        self.inner.subscribe()
    }
}
