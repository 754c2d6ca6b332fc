//! Startup errors

use pb_admin_core::CoreError;
use pb_admin_http::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
