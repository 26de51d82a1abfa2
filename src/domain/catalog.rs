//! Typed catalog response shapes.
//!
//! The catalog backend speaks a GraphQL-shaped protocol; the engine only
//! needs the URL-shaping fields of products and categories. Resolvers
//! deserialize these records from the `data` value the backend client
//! returns.

use serde::Deserialize;

/// One stored URL rewrite for a product.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlRewrite {
    pub url: String,
}

/// A category, either referenced from a product record or returned by the
/// category list query.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub uid: String,
    #[serde(default)]
    pub url_key: Option<String>,
    #[serde(default)]
    pub url_path: Option<String>,
}

impl CategoryRecord {
    /// Front-end URL of the category: the full path when the backend
    /// supplies one, the bare key otherwise.
    pub fn url(&self) -> Option<&str> {
        self.url_path
            .as_deref()
            .or(self.url_key.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Product record scoped to canonical URL shaping.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    #[serde(default)]
    pub url_key: Option<String>,
    #[serde(default)]
    pub url_rewrites: Vec<UrlRewrite>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// Envelope for the batched products query.
#[derive(Debug, Deserialize)]
pub struct ProductQueryData {
    pub products: ProductItems,
}

#[derive(Debug, Deserialize)]
pub struct ProductItems {
    #[serde(default)]
    pub items: Vec<ProductRecord>,
}

/// Envelope for the category list query.
#[derive(Debug, Deserialize)]
pub struct CategoryQueryData {
    #[serde(rename = "categoryList", default)]
    pub category_list: Vec<CategoryRecord>,
}
