//! Product SKU resolver.
//!
//! Repository side: content nodes reference a product either through the
//! direct `product` property or through the combined `selection` shape, so
//! the structural query matches both. Catalog side: one batched products
//! query filtered by SKU-in-set; each result contributes a purge path per
//! stored URL rewrite and per category the product belongs to.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{PathResolver, graphql_value_list, merge_lookups, sql_value_list};
use crate::domain::catalog::ProductQueryData;
use crate::domain::{CatalogError, RepositoryError, StoreContext, paths};
use crate::engine::ports::{CatalogClient, RepositoryClient};

pub struct ProductSkuResolver {
    repository: Arc<dyn RepositoryClient>,
    catalog: Arc<dyn CatalogClient>,
}

impl ProductSkuResolver {
    pub fn new(repository: Arc<dyn RepositoryClient>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Structural query matching both identifier property shapes under the
    /// store subtree.
    fn repository_query(store: &StoreContext, skus: &[String]) -> String {
        let list = sql_value_list(skus);
        format!(
            "SELECT content.[jcr:path] FROM [nt:unstructured] AS content \
             WHERE ISDESCENDANTNODE(content, '{root}') \
             AND (content.[product] IN {list} OR content.[selection] IN {list})",
            root = super::escape_sql_literal(&store.store_path),
        )
    }

    /// Batched catalog query returning the URL-shaping fields.
    fn catalog_query(skus: &[String]) -> String {
        format!(
            "{{products(filter:{{sku:{{in:{list}}}}}){{items{{sku url_key \
             url_rewrites{{url}} categories{{uid url_key url_path}}}}}}}}",
            list = graphql_value_list(skus),
        )
    }

    async fn repository_paths(
        &self,
        store: &StoreContext,
        skus: &[String],
    ) -> Result<HashSet<String>, RepositoryError> {
        let query = Self::repository_query(store, skus);
        let nodes = self.repository.query_paths(&query).await?;
        Ok(nodes
            .iter()
            .map(|node| paths::page_path_for_node(node))
            .collect())
    }

    async fn catalog_paths(
        &self,
        store: &StoreContext,
        skus: &[String],
    ) -> Result<HashSet<String>, CatalogError> {
        let data = self
            .catalog
            .execute(store, &Self::catalog_query(skus))
            .await?;
        let parsed: ProductQueryData = serde_json::from_value(data)
            .map_err(|err| CatalogError::malformed(err.to_string()))?;

        let mut resolved = HashSet::new();
        for product in &parsed.products.items {
            for rewrite in &product.url_rewrites {
                if rewrite.url.trim().is_empty() {
                    continue;
                }
                resolved.insert(paths::entity_purge_path(&store.product_page, &rewrite.url));
            }
            for category in &product.categories {
                if let Some(url) = category.url() {
                    resolved.insert(paths::entity_purge_path(&store.category_page, url));
                }
            }
        }
        debug!(
            products = parsed.products.items.len(),
            resolved = resolved.len(),
            "catalog product lookup resolved paths"
        );
        Ok(resolved)
    }
}

#[async_trait]
impl PathResolver for ProductSkuResolver {
    async fn resolve(&self, store: &StoreContext, values: &[String]) -> HashSet<String> {
        if values.is_empty() {
            return HashSet::new();
        }
        let (repository, catalog) = tokio::join!(
            self.repository_paths(store, values),
            self.catalog_paths(store, values)
        );
        merge_lookups("productSkus", &store.store_path, repository, catalog)
    }
}
