//! Path resolvers.
//!
//! Each built-in path strategy combines two independent lookups for one
//! attribute's changed values: a structural query against the content
//! repository (pages referencing the changed entities) and a batched
//! catalog query (canonical front-end URLs for the changed entities). The
//! two results are unioned; a failing lookup degrades to "no data from this
//! source" and never aborts its sibling.

mod category;
mod product;
mod regex;

pub use category::CategoryUidResolver;
pub use product::ProductSkuResolver;
pub use regex::validated_patterns;

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{CatalogError, RepositoryError, StoreContext};

/// Resolve the purge paths affected by one attribute's changed values.
///
/// Zero paths is a normal outcome, not an error; failures inside a resolver
/// degrade that source's contribution and are logged, never propagated.
#[async_trait]
pub trait PathResolver: Send + Sync {
    async fn resolve(&self, store: &StoreContext, values: &[String]) -> HashSet<String>;
}

/// Union the two lookup sources of one resolver, degrading each failure to
/// an empty contribution.
pub(crate) fn merge_lookups(
    attribute: &str,
    store_path: &str,
    repository: Result<HashSet<String>, RepositoryError>,
    catalog: Result<HashSet<String>, CatalogError>,
) -> HashSet<String> {
    let mut merged = HashSet::new();

    match repository {
        Ok(paths) => merged.extend(paths),
        Err(error) => warn!(
            attribute,
            store_path,
            source = "repository",
            error = %error,
            "lookup degraded to no results"
        ),
    }
    match catalog {
        Ok(paths) => merged.extend(paths),
        Err(error) => warn!(
            attribute,
            store_path,
            source = "catalog",
            error = %error,
            "lookup degraded to no results"
        ),
    }

    merged
}

/// Escape a raw identifier for embedding in a single-quoted SQL2 literal.
pub(crate) fn escape_sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a `('a', 'b', ...)` SQL2 value list.
pub(crate) fn sql_value_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|value| format!("'{}'", escape_sql_literal(value)))
        .collect();
    format!("({})", quoted.join(", "))
}

/// Render a `["a", "b", ...]` GraphQL string list, JSON-escaped.
pub(crate) fn graphql_value_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|value| serde_json::Value::String(value.clone()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_list_escapes_quotes() {
        let values = vec!["SKU1".to_string(), "it's".to_string()];
        assert_eq!(sql_value_list(&values), "('SKU1', 'it''s')");
    }

    #[test]
    fn graphql_list_json_escapes() {
        let values = vec!["a\"b".to_string()];
        assert_eq!(graphql_value_list(&values), r#"["a\"b"]"#);
    }

    #[test]
    fn merge_unions_both_sources() {
        let repo: Result<HashSet<String>, RepositoryError> =
            Ok(HashSet::from(["/a".to_string()]));
        let catalog: Result<HashSet<String>, CatalogError> =
            Ok(HashSet::from(["/b".to_string()]));
        let merged = merge_lookups("productSkus", "/content/site/en", repo, catalog);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn failed_source_degrades_without_losing_sibling() {
        let repo: Result<HashSet<String>, RepositoryError> =
            Ok(HashSet::from(["/a".to_string()]));
        let catalog: Result<HashSet<String>, CatalogError> =
            Err(CatalogError::backend("boom"));
        let merged = merge_lookups("productSkus", "/content/site/en", repo, catalog);
        assert_eq!(merged, HashSet::from(["/a".to_string()]));
    }
}
