//! scopa — dispatcher cache invalidation engine for commerce storefronts.
//!
//! Given a change notification carrying changed product SKUs, category
//! UIDs, or regex patterns, the engine resolves the cached page paths
//! affected (correlating content-repository queries with live catalog
//! lookups), collapses them to the minimal covering set, and issues one
//! purge call per surviving path against the dispatcher cache. It owns no
//! cached data itself.

pub mod config;
pub mod domain;
pub mod engine;
pub mod infra;

use std::sync::Arc;

use crate::engine::ports::{CatalogClient, RepositoryClient};
use crate::engine::resolver::{CategoryUidResolver, ProductSkuResolver};
use crate::engine::{InvalidationStrategy, StrategyRegistry};

/// Attribute key carrying changed product SKUs.
pub const ATTR_PRODUCT_SKUS: &str = "productSkus";
/// Attribute key carrying changed category UIDs.
pub const ATTR_CATEGORY_UIDS: &str = "categoryUids";
/// Attribute key carrying literal regex patterns for the repository-level
/// invalidation surface.
pub const ATTR_REGEX_PATTERNS: &str = "regexPatterns";

/// Register the built-in strategies against the given collaborators.
///
/// Providers registered later under the same component names replace these.
pub fn register_builtin_strategies(
    registry: &StrategyRegistry,
    repository: Arc<dyn RepositoryClient>,
    catalog: Arc<dyn CatalogClient>,
) {
    registry.register(
        InvalidationStrategy::path(
            ATTR_PRODUCT_SKUS,
            Some(r#""sku":\s*"(%s)""#.to_string()),
            Arc::new(ProductSkuResolver::new(
                Arc::clone(&repository),
                Arc::clone(&catalog),
            )),
        ),
        "scopa.strategy.product-skus",
    );
    registry.register(
        InvalidationStrategy::path(
            ATTR_CATEGORY_UIDS,
            Some(r#""uid":\s*"(%s)""#.to_string()),
            Arc::new(CategoryUidResolver::new(repository, catalog)),
        ),
        "scopa.strategy.category-uids",
    );
    registry.register(
        InvalidationStrategy::pattern(ATTR_REGEX_PATTERNS),
        "scopa.strategy.regex-patterns",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::domain::{CatalogError, RepositoryError, StoreContext};

    struct NullRepository;

    #[async_trait]
    impl RepositoryClient for NullRepository {
        async fn query_paths(&self, _query: &str) -> Result<Vec<String>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    struct NullCatalog;

    #[async_trait]
    impl CatalogClient for NullCatalog {
        async fn execute(
            &self,
            _store: &StoreContext,
            _query: &str,
        ) -> Result<serde_json::Value, CatalogError> {
            Ok(serde_json::json!({}))
        }
    }

    #[test]
    fn builtin_registration_covers_all_attributes() {
        let registry = StrategyRegistry::new();
        register_builtin_strategies(&registry, Arc::new(NullRepository), Arc::new(NullCatalog));

        let attributes = registry.attributes();
        assert!(attributes.contains(ATTR_PRODUCT_SKUS));
        assert!(attributes.contains(ATTR_CATEGORY_UIDS));
        assert!(attributes.contains(ATTR_REGEX_PATTERNS));
        assert_eq!(registry.len(), 3);

        // Re-registering the same component names must not duplicate.
        register_builtin_strategies(&registry, Arc::new(NullRepository), Arc::new(NullCatalog));
        assert_eq!(registry.len(), 3);
    }
}
