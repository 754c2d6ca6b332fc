//! Observable application state
//!
//! Each store is a cloneable handle over a `tokio::sync::watch` channel: writers
//! replace or modify the value, readers either take a snapshot or subscribe and
//! await changes.

pub mod collections;
pub mod form_errors;
pub mod toasts;

pub use collections::ProtectedCollections;
pub use form_errors::FormErrors;
pub use toasts::{DEFAULT_TOAST_DURATION, Toast, ToastKind, Toasts};

use crate::record::AuthRecord;
use std::sync::Arc;
use tokio::sync::watch;

/// A shared, observable value
#[derive(Debug)]
pub struct Writable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Default> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Writable<T> {
    /// Create a store holding `value`
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Modify the value in place and notify subscribers
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Run `f` against the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receive every subsequent change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone> Writable<T> {
    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

/// The signed-in superuser, `None` when signed out
pub type SuperuserStore = Writable<Option<AuthRecord>>;

/// Where the client is in establishing a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}
