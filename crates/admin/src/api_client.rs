//! Application API client
//!
//! Wraps [`PocketBaseClient`] with what every admin screen relies on: a single
//! sink for failed requests, logout, the superuser file token and restoring a
//! persisted session at startup.

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::navigator::{HOME_ROUTE, LOGIN_ROUTE, Navigator};
use futures::future::{BoxFuture, FutureExt, Shared};
use pb_admin_core::{
    AppAuthStore, AuthRecord, AuthStore, FileStorage, FormErrors, KeyValueStorage,
    LocalAuthStore, ProtectedCollections, SUPERUSERS_COLLECTION, SessionState, SuperuserStore,
    Toasts, Writable, is_token_expired,
};
use pb_admin_http::{ClientError, PocketBaseClient, PocketBaseClientBuilder, Url};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Storage key of the cached superuser file token
pub const FILE_TOKEN_STORAGE_KEY: &str = "pb_superuser_file_token";

/// A cached file token this close to expiry is replaced
pub const FILE_TOKEN_EXPIRY_THRESHOLD_SECS: i64 = 10;

/// Status assumed for errors that never got a response
const DEFAULT_ERROR_STATUS: u16 = 400;

type FileTokenRequest = Shared<BoxFuture<'static, Result<String, Arc<ClientError>>>>;

/// Observable state the client writes to and the UI reads from
#[derive(Debug, Clone, Default)]
pub struct AppStores {
    pub superuser: SuperuserStore,
    pub toasts: Toasts,
    pub form_errors: FormErrors,
    pub protected_collections: ProtectedCollections,
    pub session: Writable<SessionState>,
}

pub struct ApiClient {
    client: PocketBaseClient,
    auth_store: Arc<AppAuthStore>,
    storage: Arc<dyn KeyValueStorage>,
    stores: AppStores,
    navigator: Arc<dyn Navigator>,
    file_token_request: Mutex<Option<FileTokenRequest>>,
}

impl ApiClient {
    /// Create a client whose session is persisted in `storage`.
    ///
    /// A superuser already persisted there is published to
    /// `stores.superuser` right away; the session itself is only checked by
    /// [`restore_session`](Self::restore_session).
    pub fn new(
        builder: PocketBaseClientBuilder,
        storage: Arc<dyn KeyValueStorage>,
        stores: AppStores,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let auth_store = Arc::new(AppAuthStore::new(
            LocalAuthStore::new(storage.clone()),
            stores.superuser.clone(),
        ));
        let client = builder.auth_store(auth_store.clone()).build()?;

        Ok(Self {
            client,
            auth_store,
            storage,
            stores,
            navigator,
            file_token_request: Mutex::new(None),
        })
    }

    /// Create a client from configuration, persisting to the configured file
    pub fn from_config(
        config: &AdminConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AdminError> {
        config.validate()?;

        let storage = Arc::new(FileStorage::open(&config.storage_path)?);

        let mut builder = PocketBaseClient::builder().base_url(config.backend_url.trim());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        info!(backend = %config.backend_url, "Created API client");
        Ok(Self::new(builder, storage, AppStores::default(), navigator)?)
    }

    pub fn client(&self) -> &PocketBaseClient {
        &self.client
    }

    pub fn auth_store(&self) -> &Arc<AppAuthStore> {
        &self.auth_store
    }

    pub fn stores(&self) -> &AppStores {
        &self.stores
    }

    /// Check the persisted session against the backend.
    ///
    /// A valid token is refreshed. If the backend rejects it with 401 or 403
    /// the credentials are dropped without navigating anywhere; any other
    /// failure keeps them. A persisted token that already expired is dropped
    /// without a request.
    pub async fn restore_session(&self) -> SessionState {
        if !self.auth_store.is_valid() {
            if !self.auth_store.token().is_empty() {
                debug!("Dropping expired persisted session");
                self.clear_auth_store();
            }
            self.stores.session.set(SessionState::Unauthenticated);
            return SessionState::Unauthenticated;
        }

        self.stores.session.set(SessionState::Authenticating);

        let collection = self
            .auth_store
            .record()
            .map(|record| record.collection_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| SUPERUSERS_COLLECTION.to_string());

        let state = match self.client.collection(collection).auth_refresh().await {
            Ok(response) => {
                info!(record = %response.record.id, "Restored session");
                SessionState::Authenticated
            }
            Err(err) => {
                warn!(error = %err, "Failed to refresh the existing auth token");
                match err.status() {
                    Some(401 | 403) => {
                        self.clear_auth_store();
                        SessionState::Unauthenticated
                    }
                    _ => SessionState::Authenticated,
                }
            }
        };

        self.stores.session.set(state);
        state
    }

    /// Sign in as a superuser
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthRecord, ClientError> {
        self.stores.session.set(SessionState::Authenticating);

        match self
            .client
            .collection(SUPERUSERS_COLLECTION)
            .auth_with_password(email, password)
            .await
        {
            Ok(response) => {
                info!(record = %response.record.id, "Signed in");
                self.stores.form_errors.clear();
                self.stores.session.set(SessionState::Authenticated);
                Ok(response.record)
            }
            Err(err) => {
                let state = if self.auth_store.is_valid() {
                    SessionState::Authenticated
                } else {
                    SessionState::Unauthenticated
                };
                self.stores.session.set(state);
                Err(err)
            }
        }
    }

    /// Drop the session, optionally sending the user to the login screen
    pub fn logout(&self, redirect: bool) {
        self.clear_auth_store();
        self.stores.session.set(SessionState::Unauthenticated);

        if redirect {
            self.navigator.replace(LOGIN_ROUTE);
        }
    }

    /// [`error`](Self::error) with a toast and no fallback message
    pub fn error_default(&self, err: &ClientError) {
        self.error(err, true, "");
    }

    /// React to a failed request.
    ///
    /// Aborted requests are ignored. Otherwise the best available message is
    /// shown as an error toast (unless `notify` is false), field-level
    /// validation data goes to the form errors store, a 401 cancels pending
    /// requests and logs out, and a 403 cancels pending requests and sends the
    /// user home.
    pub fn error(&self, err: &ClientError, notify: bool, default_msg: &str) {
        if err.is_abort() {
            debug!("Ignoring aborted request");
            return;
        }

        let status = err.status().unwrap_or(DEFAULT_ERROR_STATUS);
        let response = err.response();

        let message = response
            .map(|r| r.message.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| Some(err.to_string()).filter(|m| !m.trim().is_empty()))
            .unwrap_or_else(|| default_msg.trim().to_string());

        warn!(status, message = %message, "API request failed");

        if notify && !message.is_empty() {
            self.stores.toasts.add_error(message);
        }

        if let Some(data) = response.map(|r| &r.data).filter(|data| !data.is_empty()) {
            self.stores.form_errors.set_errors(data.clone());
        }

        match status {
            401 => {
                self.client.cancel_all_requests();
                self.logout(true);
            }
            403 => {
                self.client.cancel_all_requests();
                self.navigator.replace(HOME_ROUTE);
            }
            _ => {}
        }
    }

    /// Token for downloading protected files, or an empty string when the
    /// collection's files are not protected.
    ///
    /// Collections missing from the protected-collections cache are assumed
    /// protected. The token is cached in storage and reused until it is within
    /// [`FILE_TOKEN_EXPIRY_THRESHOLD_SECS`] of expiry. Concurrent callers share
    /// a single request; once it settles, successfully or not, the next call
    /// after an expiry starts a new one.
    pub async fn get_superuser_file_token(
        &self,
        collection_id: Option<&str>,
    ) -> Result<String, Arc<ClientError>> {
        let need_token = match collection_id.filter(|id| !id.is_empty()) {
            Some(id) => self
                .stores
                .protected_collections
                .is_protected(id)
                .unwrap_or(true),
            None => true,
        };

        if !need_token {
            return Ok(String::new());
        }

        if let Some(token) = self.storage.get(FILE_TOKEN_STORAGE_KEY) {
            if !is_token_expired(&token, FILE_TOKEN_EXPIRY_THRESHOLD_SECS) {
                return Ok(token);
            }
            if let Err(e) = self.storage.remove(FILE_TOKEN_STORAGE_KEY) {
                warn!(error = %e, "Failed to drop expired file token");
            }
        }

        let request = self.file_token_request();
        let result = request.clone().await;

        // Cache before releasing the in-flight marker
        if let Ok(token) = &result
            && let Err(e) = self.storage.set(FILE_TOKEN_STORAGE_KEY, token)
        {
            warn!(error = %e, "Failed to cache file token");
        }
        self.finish_file_token_request(&request);

        result
    }

    /// Download URL of a record file, carrying a file token when the
    /// collection is protected
    pub async fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
    ) -> Result<Url, Arc<ClientError>> {
        let token = self.get_superuser_file_token(Some(collection_id)).await?;
        self.client
            .files()
            .get_url(collection_id, record_id, filename, Some(&token))
            .map_err(Arc::new)
    }

    fn file_token_request(&self) -> FileTokenRequest {
        let mut pending = self
            .file_token_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        pending
            .get_or_insert_with(|| {
                debug!("Requesting superuser file token");
                let client = self.client.clone();
                async move { client.files().get_token().await.map_err(Arc::new) }
                    .boxed()
                    .shared()
            })
            .clone()
    }

    fn finish_file_token_request(&self, request: &FileTokenRequest) {
        let mut pending = self
            .file_token_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if pending.as_ref().is_some_and(|current| current.ptr_eq(request)) {
            *pending = None;
        }
    }

    fn clear_auth_store(&self) {
        if let Err(e) = self.auth_store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::MockNavigator;
    use pb_admin_core::MemoryStorage;
    use pb_admin_http::ErrorResponse;
    use serde_json::{Map, json};

    fn response(code: u16, message: &str) -> ErrorResponse {
        ErrorResponse {
            code,
            message: message.to_string(),
            data: Map::new(),
        }
    }

    fn admin() -> AuthRecord {
        AuthRecord::new("a1", "pbc_3142635823", SUPERUSERS_COLLECTION)
    }

    fn api_client(navigator: MockNavigator) -> ApiClient {
        let api = ApiClient::new(
            PocketBaseClient::builder().base_url("http://127.0.0.1:9"),
            Arc::new(MemoryStorage::new()),
            AppStores::default(),
            Arc::new(navigator),
        )
        .unwrap();
        api.auth_store().save("token", Some(admin())).unwrap();
        api
    }

    #[test]
    fn test_unauthorized_logs_out() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_replace()
            .withf(|path| path == LOGIN_ROUTE)
            .times(1)
            .return_const(());

        let api = api_client(navigator);
        assert_eq!(api.stores().superuser.get(), Some(admin()));

        api.error_default(&ClientError::AuthenticationFailed(response(401, "Token expired.")));

        assert_eq!(api.auth_store().token(), "");
        assert_eq!(api.stores().superuser.get(), None);
        assert_eq!(api.stores().session.get(), SessionState::Unauthenticated);
        assert_eq!(api.stores().toasts.snapshot()[0].message, "Token expired.");
    }

    #[test]
    fn test_forbidden_keeps_credentials() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_replace()
            .withf(|path| path == HOME_ROUTE)
            .times(1)
            .return_const(());

        let api = api_client(navigator);
        api.error_default(&ClientError::Forbidden(response(403, "Only superusers.")));

        assert_eq!(api.auth_store().token(), "token");
        assert_eq!(api.stores().superuser.get(), Some(admin()));
    }

    #[test]
    fn test_notify_false_never_toasts() {
        let mut navigator = MockNavigator::new();
        navigator.expect_replace().times(2).return_const(());

        let api = api_client(navigator);
        let errors = [
            ClientError::BadRequest(response(400, "Invalid.")),
            ClientError::Forbidden(response(403, "Forbidden.")),
            ClientError::NotFound(response(404, "Missing.")),
            ClientError::ServerError {
                status: 500,
                response: response(500, "Boom."),
            },
            ClientError::AuthenticationFailed(response(401, "Expired.")),
        ];

        for err in &errors {
            api.error(err, false, "fallback");
        }
        assert!(api.stores().toasts.is_empty());
    }

    #[test]
    fn test_validation_data_goes_to_form_errors() {
        let mut navigator = MockNavigator::new();
        navigator.expect_replace().never();

        let api = api_client(navigator);
        let mut err = response(400, "Failed to create record.");
        err.data.insert(
            "email".to_string(),
            json!({"code": "validation_invalid_email", "message": "Must be a valid email."}),
        );

        api.error_default(&ClientError::BadRequest(err));

        assert_eq!(
            api.stores().form_errors.get("email"),
            Some(json!({"code": "validation_invalid_email", "message": "Must be a valid email."}))
        );
        assert_eq!(api.auth_store().token(), "token");
    }

    #[test]
    fn test_aborted_requests_are_ignored() {
        let mut navigator = MockNavigator::new();
        navigator.expect_replace().never();

        let api = api_client(navigator);
        api.error(&ClientError::Aborted, true, "Failed");

        assert!(api.stores().toasts.is_empty());
        assert_eq!(api.auth_store().token(), "token");
    }

    #[test]
    fn test_message_fallbacks() {
        let mut navigator = MockNavigator::new();
        navigator.expect_replace().never();
        let api = api_client(navigator);

        api.error(
            &ClientError::ServerError {
                status: 502,
                response: response(502, ""),
            },
            true,
            "Failed to load collections.",
        );
        api.error(&ClientError::Configuration("base_url is required".into()), true, "");

        api.error(
            &ClientError::NotFound(response(404, "The requested resource wasn't found.")),
            true,
            "Failed to load collections.",
        );

        let toasts = api.stores().toasts.snapshot();
        assert_eq!(toasts[0].message, "Server error 502: status 502");
        assert_eq!(
            toasts[1].message,
            "Invalid configuration: base_url is required"
        );
        assert_eq!(toasts[2].message, "The requested resource wasn't found.");
        assert!(toasts.iter().all(|t| t.message != "Failed to load collections."));
    }

    #[tokio::test]
    async fn test_unprotected_collection_needs_no_token() {
        let navigator = MockNavigator::new();
        let api = api_client(navigator);
        api.stores().protected_collections.set("pbc_posts", false);

        let token = api.get_superuser_file_token(Some("pbc_posts")).await.unwrap();
        assert_eq!(token, "");
    }

    #[tokio::test]
    async fn test_cached_file_token_is_reused() {
        let navigator = MockNavigator::new();
        let api = api_client(navigator);

        let cached = make_token(chrono::Utc::now().timestamp() + 3600);
        api.storage.set(FILE_TOKEN_STORAGE_KEY, &cached).unwrap();

        let token = api.get_superuser_file_token(None).await.unwrap();
        assert_eq!(token, cached);
    }

    fn make_token(exp: i64) -> String {
        use base64::Engine;
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(json!({ "exp": exp }).to_string());
        format!("e30.{payload}.signature")
    }
}
