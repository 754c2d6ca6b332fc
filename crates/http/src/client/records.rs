//! Record auth endpoints

use super::PocketBaseClient;
use super::error::ClientError;
use crate::types::{AuthResponse, AuthWithPasswordRequest};
use reqwest::Method;
use tracing::debug;

/// Operations on the records of one auth collection
pub struct RecordService<'a> {
    client: &'a PocketBaseClient,
    collection: String,
}

impl<'a> RecordService<'a> {
    pub(super) fn new(client: &'a PocketBaseClient, collection: String) -> Self {
        Self { client, collection }
    }

    /// Exchange the current token for a fresh one.
    ///
    /// The new token and record are saved into the client's auth store.
    pub async fn auth_refresh(&self) -> Result<AuthResponse, ClientError> {
        let request = self.client.request(
            Method::POST,
            &format!("/api/collections/{}/auth-refresh", self.collection),
        );
        let response: AuthResponse = self.client.execute(request).await?;
        self.save(&response)?;
        Ok(response)
    }

    /// Authenticate with an identity (usually the email) and password.
    ///
    /// The returned token and record are saved into the client's auth store.
    pub async fn auth_with_password(
        &self,
        identity: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, ClientError> {
        let request = self
            .client
            .request(
                Method::POST,
                &format!("/api/collections/{}/auth-with-password", self.collection),
            )
            .json(&AuthWithPasswordRequest {
                identity: identity.into(),
                password: password.into(),
            });
        let response: AuthResponse = self.client.execute(request).await?;
        self.save(&response)?;
        Ok(response)
    }

    fn save(&self, response: &AuthResponse) -> Result<(), ClientError> {
        debug!(
            collection = %self.collection,
            record = %response.record.id,
            "Saving refreshed credentials"
        );
        self.client
            .auth_store()
            .save(&response.token, Some(response.record.clone()))?;
        Ok(())
    }
}
