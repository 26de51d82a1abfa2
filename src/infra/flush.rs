//! Dispatcher purge transport.
//!
//! One request per path: the purge instruction names the action, the target
//! handle, and a resource-only scope (descendant propagation is the edge
//! cache's business, not ours). No retry, no backoff; the caller logs
//! per-path failures and moves on.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::domain::FlushError;
use crate::engine::ports::FlushTransport;

const ACTION_HEADER: &str = "CQ-Action";
const HANDLE_HEADER: &str = "CQ-Handle";
const SCOPE_HEADER: &str = "CQ-Action-Scope";

const ACTION_DELETE: &str = "Delete";
const SCOPE_RESOURCE_ONLY: &str = "ResourceOnly";

pub struct DispatcherFlushClient {
    client: Client,
    endpoint: Url,
}

impl DispatcherFlushClient {
    pub fn new(endpoint: Url) -> Result<Self, FlushError> {
        let client = Client::builder()
            .user_agent(concat!("scopa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FlushError::Transport {
                path: endpoint.to_string(),
                source,
            })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl FlushTransport for DispatcherFlushClient {
    async fn flush(&self, path: &str) -> Result<(), FlushError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACTION_HEADER, ACTION_DELETE)
            .header(HANDLE_HEADER, path)
            .header(SCOPE_HEADER, SCOPE_RESOURCE_ONLY)
            .send()
            .await
            .map_err(|source| FlushError::Transport {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FlushError::Rejected {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        debug!(path, status = status.as_u16(), body = %body, "purge accepted");
        Ok(())
    }
}
