//! Toast notifications

use super::Writable;
use std::time::Duration;

/// How long a toast stays visible unless the caller says otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A single notification waiting to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

/// Queue of visible toasts. A message is never shown twice at once.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    inner: Writable<Vec<Toast>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast, replacing an existing one with the same message
    pub fn add(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        let message = message.into();
        self.inner.update(|toasts| {
            toasts.retain(|t| t.message != message);
            toasts.push(Toast {
                message,
                kind,
                duration,
            });
        });
    }

    pub fn add_error(&self, message: impl Into<String>) {
        self.add(message, ToastKind::Error, DEFAULT_TOAST_DURATION);
    }

    pub fn clear(&self) {
        self.inner.set(Vec::new());
    }

    /// Currently visible toasts, oldest first
    pub fn snapshot(&self) -> Vec<Toast> {
        self.inner.get()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.with(Vec::is_empty)
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Vec<Toast>> {
        self.inner.subscribe()
    }
}
