//! Category UID resolver.
//!
//! Repository side: content nodes reference a category through the single
//! `categoryId` property or the multi-valued `categoryIds` shape. Catalog
//! side: a category list query filtered by uid-in-set; each result
//! contributes its own canonical category path.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{PathResolver, graphql_value_list, merge_lookups, sql_value_list};
use crate::domain::catalog::CategoryQueryData;
use crate::domain::{CatalogError, RepositoryError, StoreContext, paths};
use crate::engine::ports::{CatalogClient, RepositoryClient};

pub struct CategoryUidResolver {
    repository: Arc<dyn RepositoryClient>,
    catalog: Arc<dyn CatalogClient>,
}

impl CategoryUidResolver {
    pub fn new(repository: Arc<dyn RepositoryClient>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    fn repository_query(store: &StoreContext, uids: &[String]) -> String {
        let list = sql_value_list(uids);
        format!(
            "SELECT content.[jcr:path] FROM [nt:unstructured] AS content \
             WHERE ISDESCENDANTNODE(content, '{root}') \
             AND (content.[categoryId] IN {list} OR content.[categoryIds] IN {list})",
            root = super::escape_sql_literal(&store.store_path),
        )
    }

    fn catalog_query(uids: &[String]) -> String {
        format!(
            "{{categoryList(filters:{{category_uid:{{in:{list}}}}}){{uid url_key url_path}}}}",
            list = graphql_value_list(uids),
        )
    }

    async fn repository_paths(
        &self,
        store: &StoreContext,
        uids: &[String],
    ) -> Result<HashSet<String>, RepositoryError> {
        let query = Self::repository_query(store, uids);
        let nodes = self.repository.query_paths(&query).await?;
        Ok(nodes
            .iter()
            .map(|node| paths::page_path_for_node(node))
            .collect())
    }

    async fn catalog_paths(
        &self,
        store: &StoreContext,
        uids: &[String],
    ) -> Result<HashSet<String>, CatalogError> {
        let data = self
            .catalog
            .execute(store, &Self::catalog_query(uids))
            .await?;
        let parsed: CategoryQueryData = serde_json::from_value(data)
            .map_err(|err| CatalogError::malformed(err.to_string()))?;

        let mut resolved = HashSet::new();
        for category in &parsed.category_list {
            if let Some(url) = category.url() {
                resolved.insert(paths::entity_purge_path(&store.category_page, url));
            }
        }
        debug!(
            categories = parsed.category_list.len(),
            resolved = resolved.len(),
            "catalog category lookup resolved paths"
        );
        Ok(resolved)
    }
}

#[async_trait]
impl PathResolver for CategoryUidResolver {
    async fn resolve(&self, store: &StoreContext, values: &[String]) -> HashSet<String> {
        if values.is_empty() {
            return HashSet::new();
        }
        let (repository, catalog) = tokio::join!(
            self.repository_paths(store, values),
            self.catalog_paths(store, values)
        );
        merge_lookups("categoryUids", &store.store_path, repository, catalog)
    }
}
