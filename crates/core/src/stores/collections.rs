//! Cache of which collections serve protected files

use super::Writable;
use std::collections::HashMap;

/// Collection id to "files require a token" flag
#[derive(Debug, Clone, Default)]
pub struct ProtectedCollections {
    inner: Writable<HashMap<String, bool>>,
}

impl ProtectedCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the collection has not been seen yet
    pub fn is_protected(&self, collection_id: &str) -> Option<bool> {
        self.inner.with(|cache| cache.get(collection_id).copied())
    }

    pub fn set(&self, collection_id: impl Into<String>, protected: bool) {
        let collection_id = collection_id.into();
        self.inner.update(|cache| {
            cache.insert(collection_id, protected);
        });
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let cache = ProtectedCollections::new();
        assert_eq!(cache.is_protected("posts"), None);

        cache.set("posts", false);
        cache.set("invoices", true);
        assert_eq!(cache.is_protected("posts"), Some(false));
        assert_eq!(cache.is_protected("invoices"), Some(true));

        cache.set("posts", true);
        assert_eq!(cache.is_protected("posts"), Some(true));
    }
}
