//! Client configuration
//!
//! Sources, later ones overriding earlier ones: built-in defaults, a TOML file
//! (explicit path, or the first of [`CONFIG_PATHS`] that exists), then
//! environment variables prefixed with `PB_` such as `PB_BACKEND_URL`.

use config::{Config, ConfigError, Environment, File};
use pb_admin_core::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config files probed when no explicit path is given
pub const CONFIG_PATHS: [&str; 2] = ["pb-admin.toml", "config/pb-admin.toml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Backend base URL
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// File holding persisted client state (session, cached file token)
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Per-request timeout in seconds, 0 disables it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log level filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit log lines as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pb-admin")
        .join("storage.json")
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            storage_path: default_storage_path(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl AdminConfig {
    /// Load configuration from defaults, a config file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Start with defaults
        builder = builder.add_source(Config::try_from(&AdminConfig::default())?);

        match path {
            Some(path) => builder = builder.add_source(File::from(path)),
            None => {
                for candidate in CONFIG_PATHS {
                    if Path::new(candidate).exists() {
                        builder = builder.add_source(File::with_name(candidate).required(false));
                        break;
                    }
                }
            }
        }

        builder = builder.add_source(Environment::with_prefix("PB").try_parsing(true));

        builder.build()?.try_deserialize()
    }

    /// Request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Reject values the client cannot start with
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(CoreError::invalid_config("backend_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::invalid_config(format!(
                "backend_url must be an http(s) URL, got {url}"
            )));
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(CoreError::invalid_config("storage_path must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AdminConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.storage_path.ends_with("pb-admin/storage.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pb-admin.toml");
        std::fs::write(
            &path,
            r#"
backend_url = "https://pb.example.com"
request_timeout_secs = 0
"#,
        )
        .unwrap();

        let config = AdminConfig::load(Some(&path)).unwrap();
        assert_eq!(config.backend_url, "https://pb.example.com");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_validation() {
        let config = AdminConfig {
            backend_url: "ftp://example.com".to_string(),
            ..AdminConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig { .. })
        ));

        let config = AdminConfig {
            backend_url: String::new(),
            ..AdminConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
