//! Client-side navigation

use pb_admin_core::Writable;
use tracing::info;

/// Route the user is sent to after the session is dropped
pub const LOGIN_ROUTE: &str = "/login";
/// Route the user is sent to when a resource is off limits
pub const HOME_ROUTE: &str = "/";

/// Replaces the current location, without adding a history entry
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}

/// Navigator that tracks the current location in an observable store
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    location: Writable<String>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self {
            location: Writable::new(HOME_ROUTE.to_string()),
        }
    }

    pub fn location(&self) -> String {
        self.location.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<String> {
        self.location.subscribe()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for HistoryNavigator {
    fn replace(&self, path: &str) {
        let from = self.location.get();
        info!(from = %from, to = %path, "Navigating");
        self.location.set(path.to_string());
    }
}
