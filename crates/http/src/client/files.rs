//! File endpoints

use super::PocketBaseClient;
use super::error::ClientError;
use crate::types::FileTokenResponse;
use reqwest::{Method, Url};

pub struct FileService<'a> {
    client: &'a PocketBaseClient,
}

impl<'a> FileService<'a> {
    pub(super) fn new(client: &'a PocketBaseClient) -> Self {
        Self { client }
    }

    /// Request a short-lived token for downloading protected files.
    ///
    /// Requires the client to be authenticated.
    pub async fn get_token(&self) -> Result<String, ClientError> {
        let request = self.client.request(Method::POST, "/api/files/token");
        let response: FileTokenResponse = self.client.execute(request).await?;
        Ok(response.token)
    }

    /// Absolute download URL of a record file, with the file token appended
    /// when one is given.
    pub fn get_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
        token: Option<&str>,
    ) -> Result<Url, ClientError> {
        let mut url = Url::parse(self.client.base_url())
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["api", "files", collection_id, record_id, filename]);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("token", token);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::PocketBaseClient;

    #[test]
    fn test_file_url() {
        let client = PocketBaseClient::new("http://127.0.0.1:8090/").unwrap();

        let url = client
            .files()
            .get_url("pbc_docs", "r1", "report 2024.pdf", Some("tok"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8090/api/files/pbc_docs/r1/report%202024.pdf?token=tok"
        );

        let url = client.files().get_url("c", "r", "a.png", Some("")).unwrap();
        assert_eq!(url.query(), None);
    }
}
