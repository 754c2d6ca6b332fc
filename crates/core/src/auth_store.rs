//! Auth token persistence
//!
//! [`AuthStore`] is the persistence seam the HTTP client reads its bearer token
//! from and writes refreshed credentials to. [`LocalAuthStore`] mirrors the
//! credentials into a [`KeyValueStorage`]; [`AppAuthStore`] wraps any store and
//! publishes superuser changes to a [`SuperuserStore`].

use crate::error::CoreResult;
use crate::record::AuthRecord;
use crate::storage::KeyValueStorage;
use crate::stores::SuperuserStore;
use crate::token::is_token_expired;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Storage key the superuser session is persisted under
pub const AUTH_STORAGE_KEY: &str = "__pb_superuser_auth__";

/// Container for the current bearer token and the record it belongs to
pub trait AuthStore: Send + Sync {
    /// Current token, empty when signed out
    fn token(&self) -> String;

    /// Record the token was issued for
    fn record(&self) -> Option<AuthRecord>;

    /// Replace the stored credentials
    fn save(&self, token: &str, record: Option<AuthRecord>) -> CoreResult<()>;

    /// Forget the stored credentials
    fn clear(&self) -> CoreResult<()>;

    /// Whether there is a token and it has not expired
    fn is_valid(&self) -> bool {
        let token = self.token();
        !token.is_empty() && !is_token_expired(&token, 0)
    }

    /// Whether the stored record is a superuser
    fn is_superuser(&self) -> bool {
        self.record().is_some_and(|record| record.is_superuser())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default)]
    token: String,
    #[serde(default)]
    record: Option<AuthRecord>,
}

/// Auth store mirrored into key/value storage
pub struct LocalAuthStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    state: RwLock<Credentials>,
}

impl LocalAuthStore {
    /// Open the store under [`AUTH_STORAGE_KEY`]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, AUTH_STORAGE_KEY)
    }

    /// Open the store under a custom key, loading any persisted credentials
    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();

        let state = match storage.get(&key) {
            Some(raw) => serde_json::from_str::<Credentials>(&raw).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Ignoring unreadable persisted credentials");
                Credentials::default()
            }),
            None => Credentials::default(),
        };

        debug!(
            key = %key,
            has_token = !state.token.is_empty(),
            "Loaded auth store"
        );

        Self {
            storage,
            key,
            state: RwLock::new(state),
        }
    }
}

impl AuthStore for LocalAuthStore {
    fn token(&self) -> String {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    fn record(&self) -> Option<AuthRecord> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .record
            .clone()
    }

    fn save(&self, token: &str, record: Option<AuthRecord>) -> CoreResult<()> {
        let credentials = Credentials {
            token: token.to_string(),
            record,
        };

        self.storage
            .set(&self.key, &serde_json::to_string(&credentials)?)?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = credentials;
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        self.storage.remove(&self.key)?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Credentials::default();
        Ok(())
    }
}

/// Decorator that keeps the shared superuser store in step with an auth store.
///
/// A save publishes the record only when it belongs to the superusers
/// collection; saves of other records leave the published value alone. A clear
/// always publishes `None`. Nothing is published if the wrapped store fails.
pub struct AppAuthStore<S = LocalAuthStore> {
    inner: S,
    superuser: SuperuserStore,
}

impl<S: AuthStore> AppAuthStore<S> {
    /// Wrap `inner`, publishing the superuser it already holds, if any
    pub fn new(inner: S, superuser: SuperuserStore) -> Self {
        if let Some(record) = inner.record().filter(AuthRecord::is_superuser) {
            superuser.set(Some(record));
        }
        Self { inner, superuser }
    }

    /// Handle to the published superuser
    pub fn superuser(&self) -> &SuperuserStore {
        &self.superuser
    }
}

impl<S: AuthStore> AuthStore for AppAuthStore<S> {
    fn token(&self) -> String {
        self.inner.token()
    }

    fn record(&self) -> Option<AuthRecord> {
        self.inner.record()
    }

    fn save(&self, token: &str, record: Option<AuthRecord>) -> CoreResult<()> {
        let published = record.clone().filter(AuthRecord::is_superuser);
        self.inner.save(token, record)?;
        if let Some(record) = published {
            debug!(id = %record.id, "Publishing superuser");
            self.superuser.set(Some(record));
        }
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        self.inner.clear()?;
        self.superuser.set(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::record::SUPERUSERS_COLLECTION;
    use crate::storage::MemoryStorage;
    use crate::stores::Writable;
    use crate::token::tests::make_token;
    use serde_json::json;

    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> CoreResult<()> {
            Err(CoreError::storage("quota exceeded"))
        }

        fn remove(&self, _key: &str) -> CoreResult<()> {
            Err(CoreError::storage("storage unavailable"))
        }
    }

    fn admin() -> AuthRecord {
        AuthRecord::new("a1", "pbc_3142635823", SUPERUSERS_COLLECTION)
    }

    fn app_store() -> (Arc<MemoryStorage>, AppAuthStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AppAuthStore::new(LocalAuthStore::new(storage.clone()), Writable::default());
        (storage, store)
    }

    #[test]
    fn test_local_store_persists_and_reloads() {
        let storage = Arc::new(MemoryStorage::new());
        let token = make_token(json!({"exp": chrono::Utc::now().timestamp() + 3600}));

        let store = LocalAuthStore::new(storage.clone());
        assert!(!store.is_valid());
        store.save(&token, Some(admin())).unwrap();
        assert!(store.is_valid());
        assert!(store.is_superuser());
        assert!(storage.get(AUTH_STORAGE_KEY).is_some());

        let reloaded = LocalAuthStore::new(storage.clone());
        assert_eq!(reloaded.token(), token);
        assert_eq!(reloaded.record(), Some(admin()));

        reloaded.clear().unwrap();
        assert!(storage.get(AUTH_STORAGE_KEY).is_none());
        assert_eq!(reloaded.token(), "");
        assert_eq!(reloaded.record(), None);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalAuthStore::new(storage);
        let token = make_token(json!({"exp": chrono::Utc::now().timestamp() - 60}));
        store.save(&token, Some(admin())).unwrap();
        assert!(!store.is_valid());
    }

    #[test]
    fn test_corrupt_entry_is_ignored() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(AUTH_STORAGE_KEY, "not json").unwrap();

        let store = LocalAuthStore::new(storage);
        assert_eq!(store.token(), "");
        assert_eq!(store.record(), None);
    }

    #[test]
    fn test_superuser_save_publishes() {
        let (_, store) = app_store();
        store.save("token", Some(admin())).unwrap();
        assert_eq!(store.superuser().get(), Some(admin()));
    }

    #[test]
    fn test_regular_save_keeps_previous_superuser() {
        let (_, store) = app_store();
        store.save("token", Some(admin())).unwrap();

        let user = AuthRecord::new("u1", "pbc_users", "users");
        store.save("other-token", Some(user.clone())).unwrap();

        assert_eq!(store.record(), Some(user));
        assert_eq!(store.superuser().get(), Some(admin()));
    }

    #[test]
    fn test_clear_publishes_none() {
        let (_, store) = app_store();
        store.save("token", Some(admin())).unwrap();
        store.clear().unwrap();
        assert_eq!(store.superuser().get(), None);
        assert_eq!(store.token(), "");
    }

    #[test]
    fn test_construction_publishes_persisted_superuser() {
        let storage = Arc::new(MemoryStorage::new());
        LocalAuthStore::new(storage.clone())
            .save("token", Some(admin()))
            .unwrap();

        let superuser = Writable::default();
        let _store = AppAuthStore::new(LocalAuthStore::new(storage), superuser.clone());
        assert_eq!(superuser.get(), Some(admin()));
    }

    #[test]
    fn test_storage_failure_publishes_nothing() {
        let superuser = Writable::new(Some(admin()));
        let store = AppAuthStore::new(
            LocalAuthStore::new(Arc::new(ReadOnlyStorage)),
            superuser.clone(),
        );

        let other = AuthRecord::new("a2", "pbc_3142635823", SUPERUSERS_COLLECTION);
        assert!(store.save("token", Some(other)).is_err());
        assert!(store.clear().is_err());
        assert_eq!(superuser.get(), Some(admin()));
    }
}
