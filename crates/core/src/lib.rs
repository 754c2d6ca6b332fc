//! Core session state for the admin client: auth records, token inspection,
//! persistent storage and observable stores.

pub mod auth_store;
pub mod error;
pub mod record;
pub mod storage;
pub mod stores;
pub mod token;

pub use auth_store::{AUTH_STORAGE_KEY, AppAuthStore, AuthStore, LocalAuthStore};
pub use error::{CoreError, CoreResult};
pub use record::{AuthRecord, SUPERUSERS_COLLECTION};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use stores::{
    FormErrors, ProtectedCollections, SessionState, SuperuserStore, Toast, ToastKind, Toasts,
    Writable,
};
pub use token::{is_token_expired, token_payload};
