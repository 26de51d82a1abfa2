//! Collaborator seams the engine consumes.
//!
//! The production implementations live in `crate::infra`; tests substitute
//! in-memory fakes. All three are object-safe so the engine can hold them
//! behind `Arc<dyn _>`.

use async_trait::async_trait;

use crate::domain::{CatalogError, FlushError, RepositoryError, StoreContext};

/// Catalog backend: execute a GraphQL-shaped query, get the `data` value or
/// a failure. A non-empty backend error list is a failure. The store
/// context carries the client identifier and store view the backend routes
/// by.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn execute(
        &self,
        store: &StoreContext,
        query: &str,
    ) -> Result<serde_json::Value, CatalogError>;
}

/// Content repository: execute a structural query, get matching node paths.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    async fn query_paths(&self, query: &str) -> Result<Vec<String>, RepositoryError>;
}

/// Dispatcher purge transport: one purge instruction per path, resource-only
/// scope. Failures are per-path and never abort the caller's loop.
#[async_trait]
pub trait FlushTransport: Send + Sync {
    async fn flush(&self, path: &str) -> Result<(), FlushError>;
}
