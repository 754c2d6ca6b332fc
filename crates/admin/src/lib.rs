//! Superuser session client for PocketBase-style admin backends

pub mod api_client;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigator;

pub use api_client::{
    ApiClient, AppStores, FILE_TOKEN_EXPIRY_THRESHOLD_SECS, FILE_TOKEN_STORAGE_KEY,
};
pub use config::AdminConfig;
pub use error::AdminError;
pub use navigator::{HOME_ROUTE, HistoryNavigator, LOGIN_ROUTE, Navigator};
