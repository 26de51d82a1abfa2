//! Attribute extraction.
//!
//! Walks the registry's known attribute keys (never the raw bag's keys, so
//! unregistered properties are ignored rather than misinterpreted) and
//! keeps the attributes that carry non-empty values and have at least one
//! strategy on the dispatcher surface.

use std::collections::HashMap;
use std::sync::Arc;

use super::registry::StrategyRegistry;
use crate::domain::ChangeNotification;

pub struct AttributeExtractor {
    registry: Arc<StrategyRegistry>,
}

impl AttributeExtractor {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self { registry }
    }

    /// Relevant changed attributes: key → values, notification order kept.
    pub fn extract(&self, notification: &ChangeNotification) -> HashMap<String, Vec<String>> {
        let mut extracted = HashMap::new();

        for attribute in self.registry.attributes() {
            let dispatcher_relevant = self
                .registry
                .lookup(&attribute)
                .iter()
                .any(|strategy| strategy.resolves_paths());
            if !dispatcher_relevant {
                continue;
            }

            if let Some(values) = notification.values_for(&attribute) {
                extracted.insert(attribute, values);
            }
        }

        extracted
    }
}
