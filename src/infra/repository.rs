//! HTTP content-repository query client.
//!
//! Stands in for the repository's query service boundary: POST the
//! structural query string, get back a JSON array of matching node paths.
//! Any SQL-capable hierarchical store can serve this endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::domain::RepositoryError;
use crate::engine::ports::RepositoryClient;

pub struct HttpRepositoryClient {
    client: Client,
    endpoint: Url,
}

impl HttpRepositoryClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .user_agent(concat!("scopa/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RepositoryClient for HttpRepositoryClient {
    async fn query_paths(&self, query: &str) -> Result<Vec<String>, RepositoryError> {
        debug!(endpoint = %self.endpoint, "executing repository query");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|err| RepositoryError::malformed(err.to_string()))
    }
}
