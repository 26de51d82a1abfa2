//! Storefront bindings.
//!
//! A store path only becomes actionable once it resolves to a commerce
//! binding: the catalog client identifier, the store view, and the page
//! roots that front-end URLs for products and categories hang off.

use std::collections::HashMap;

/// Resolved commerce binding for one storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreContext {
    /// Content root identifying the storefront (e.g. `/content/site/en`).
    pub store_path: String,
    /// Identifier of the catalog backend client serving this store.
    pub client_id: String,
    /// Store view code sent to the catalog backend.
    pub store_view: String,
    /// Page under which product URLs are rendered.
    pub product_page: String,
    /// Page under which category URLs are rendered.
    pub category_page: String,
}

impl StoreContext {
    /// The path a full clear purges: the store's content root.
    pub fn base_path(&self) -> &str {
        &self.store_path
    }
}

/// Lookup table from store path to its commerce binding.
///
/// Built once from settings at startup; resolution failures are a full-clear
/// signal, not an error (the decider owns that call).
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, StoreContext>,
}

impl StoreRegistry {
    pub fn new(contexts: impl IntoIterator<Item = StoreContext>) -> Self {
        Self {
            stores: contexts
                .into_iter()
                .map(|ctx| (ctx.store_path.clone(), ctx))
                .collect(),
        }
    }

    pub fn resolve(&self, store_path: &str) -> Option<&StoreContext> {
        self.stores.get(store_path)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> StoreContext {
    StoreContext {
        store_path: "/content/site/en".to_string(),
        client_id: "default".to_string(),
        store_view: "en".to_string(),
        product_page: "/content/site/en/product-page".to_string(),
        category_page: "/content/site/en/category-page".to_string(),
    }
}
