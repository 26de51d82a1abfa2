//! Change notification intake shape.
//!
//! A notification carries the store path of the affected storefront, a bag
//! of changed attribute values, and an optional explicit full-clear flag.
//! The engine never trusts the bag's keys directly; the attribute extractor
//! filters it against the strategy registry.

use std::collections::HashMap;

use serde::Deserialize;
use time::OffsetDateTime;

/// One raw property value from a change notification.
///
/// Producers send either a single string or a list; both shapes are kept so
/// emptiness checks can distinguish "not supplied" from "supplied but blank".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// The changed values, in notification order.
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::Text(value) => vec![value.clone()],
            Self::List(values) => values.clone(),
        }
    }

    /// True when the value carries no usable content.
    ///
    /// An empty string, an empty list, and a list of blank strings all count
    /// as "not supplied".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::List(values) => values.iter().all(|value| value.trim().is_empty()),
        }
    }
}

/// External input to one invalidation pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    /// Content root of the affected storefront.
    pub store_path: String,
    /// Attribute key → changed raw values.
    #[serde(default)]
    pub attributes: HashMap<String, PropertyValue>,
    /// Explicit request to clear the whole store subtree.
    #[serde(default)]
    pub full_clear: bool,
    /// When the notification was received, for log correlation.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

impl ChangeNotification {
    /// Build a notification programmatically (tests, embedding callers).
    pub fn new(store_path: impl Into<String>) -> Self {
        Self {
            store_path: store_path.into(),
            attributes: HashMap::new(),
            full_clear: false,
            received_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes
            .insert(key.into(), PropertyValue::List(values));
        self
    }

    pub fn with_full_clear(mut self) -> Self {
        self.full_clear = true;
        self
    }

    /// Changed values for one attribute, if supplied and non-empty.
    pub fn values_for(&self, key: &str) -> Option<Vec<String>> {
        self.attributes
            .get(key)
            .filter(|value| !value.is_empty())
            .map(PropertyValue::values)
    }
}
