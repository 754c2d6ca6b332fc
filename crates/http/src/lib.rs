//! HTTP client for the backend's record auth and file endpoints
//!
//! The client reads its bearer token from a shared [`AuthStore`] and writes
//! refreshed credentials back to it, so session state lives in one place.
//!
//! [`AuthStore`]: pb_admin_core::AuthStore

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::files::FileService;
pub use client::records::RecordService;
pub use client::{PocketBaseClient, PocketBaseClientBuilder};
pub use reqwest::Url;
pub use types::{AuthResponse, ErrorResponse, FileTokenResponse};
