//! Backend API client

pub mod error;
pub mod files;
pub mod records;

use crate::types::ErrorResponse;
use error::ClientError;
use files::FileService;
use pb_admin_core::{AuthStore, LocalAuthStore, MemoryStorage};
use records::RecordService;
use reqwest::{Client, ClientBuilder, header};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = concat!("pb-admin/", env!("CARGO_PKG_VERSION"));

/// Backend API client
///
/// Clones share the connection pool, the auth store and the cancellation
/// scope, so [`cancel_all_requests`](Self::cancel_all_requests) on any clone
/// aborts requests started from every clone.
#[derive(Clone)]
pub struct PocketBaseClient {
    client: Client,
    base_url: String,
    auth_store: Arc<dyn AuthStore>,
    cancel: Arc<Mutex<CancellationToken>>,
}

impl PocketBaseClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> PocketBaseClientBuilder {
        PocketBaseClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store the bearer token is read from and refreshed credentials go to
    pub fn auth_store(&self) -> &Arc<dyn AuthStore> {
        &self.auth_store
    }

    /// Record operations scoped to one collection
    pub fn collection(&self, name: impl Into<String>) -> RecordService<'_> {
        RecordService::new(self, name.into())
    }

    /// File endpoints
    pub fn files(&self) -> FileService<'_> {
        FileService::new(self)
    }

    /// Create a request builder carrying the current auth token
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        let token = self.auth_store.token();
        if !token.is_empty() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Execute a request and handle common errors.
    ///
    /// Resolves to [`ClientError::Aborted`] if the request is still pending
    /// when [`cancel_all_requests`](Self::cancel_all_requests) is called.
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let cancelled = self.cancellation_token();

        tokio::select! {
            biased;
            () = cancelled.cancelled() => Err(ClientError::Aborted),
            result = Self::send(request) => result,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Request failed");
            Err(ClientError::from_status(
                status,
                ErrorResponse::from_body(status.as_u16(), &body),
            ))
        }
    }

    /// Abort every request currently in flight.
    ///
    /// Requests started afterwards are unaffected.
    pub fn cancel_all_requests(&self) {
        let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        debug!("Cancelled all pending requests");
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Builder for PocketBaseClient
#[derive(Default)]
pub struct PocketBaseClientBuilder {
    base_url: Option<String>,
    auth_store: Option<Arc<dyn AuthStore>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl PocketBaseClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a shared auth store instead of a throwaway in-memory one
    pub fn auth_store(mut self, store: Arc<dyn AuthStore>) -> Self {
        self.auth_store = Some(store);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<PocketBaseClient, ClientError> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        let client = client_builder.build()?;

        let auth_store = self.auth_store.unwrap_or_else(|| {
            Arc::new(LocalAuthStore::new(Arc::new(MemoryStorage::new())))
        });

        Ok(PocketBaseClient {
            client,
            base_url,
            auth_store,
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
        })
    }
}
