//! HTTP catalog backend client.
//!
//! Speaks the GraphQL-shaped wire protocol: POST `{"query": ...}` to the
//! configured endpoint, unwrap the `{data, errors}` envelope. The engine
//! only needs "execute query, get typed data or failure".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::domain::{CatalogError, StoreContext};
use crate::engine::ports::CatalogClient;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    message: String,
}

const STORE_HEADER: &str = "Store";
const CLIENT_HEADER: &str = "X-Catalog-Client";

pub struct HttpCatalogClient {
    client: Client,
    endpoint: Url,
}

impl HttpCatalogClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

fn user_agent() -> &'static str {
    concat!("scopa/", env!("CARGO_PKG_VERSION"))
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn execute(
        &self,
        store: &StoreContext,
        query: &str,
    ) -> Result<serde_json::Value, CatalogError> {
        debug!(
            endpoint = %self.endpoint,
            client_id = %store.client_id,
            store_view = %store.store_view,
            "executing catalog query"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(STORE_HEADER, &store.store_view)
            .header(CLIENT_HEADER, &store.client_id)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|err| CatalogError::malformed(err.to_string()))?;

        if !envelope.errors.is_empty() {
            let summary = envelope
                .errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::backend(summary));
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::malformed("response carried no data value"))
    }
}
