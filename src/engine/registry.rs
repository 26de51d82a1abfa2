//! Strategy registry.
//!
//! Maps attribute keys to ordered lists of registered strategies, keyed by
//! a stable component name so a provider can re-register without leaving a
//! duplicate behind. Strategies attach and detach independently of
//! invalidation passes, so the registry is the one piece of shared mutable
//! state in the engine; lookups must never observe a partially-updated
//! entry.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::lock::{rw_read, rw_write};
use super::strategy::InvalidationStrategy;

const SOURCE: &str = "engine::registry";

struct Registration {
    component: String,
    strategy: Arc<InvalidationStrategy>,
}

#[derive(Default)]
struct Inner {
    /// Registration order is lookup order.
    registrations: Vec<Registration>,
}

/// Concurrent attribute → strategies registry.
#[derive(Default)]
pub struct StrategyRegistry {
    inner: RwLock<Inner>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under a component name.
    ///
    /// A component name that already has an entry (for any attribute) is
    /// replaced in place, preserving at most one strategy per component.
    pub fn register(&self, strategy: InvalidationStrategy, component: impl Into<String>) {
        let component = component.into();
        let registration = Registration {
            component: component.clone(),
            strategy: Arc::new(strategy),
        };

        let mut inner = rw_write(&self.inner, SOURCE, "register");
        if let Some(existing) = inner
            .registrations
            .iter_mut()
            .find(|reg| reg.component == component)
        {
            *existing = registration;
        } else {
            inner.registrations.push(registration);
        }
    }

    /// Remove the strategy registered under a component name, if any.
    pub fn unregister(&self, component: &str) -> bool {
        let mut inner = rw_write(&self.inner, SOURCE, "unregister");
        let before = inner.registrations.len();
        inner.registrations.retain(|reg| reg.component != component);
        inner.registrations.len() != before
    }

    /// Strategies registered for an attribute key, in registration order.
    ///
    /// An unknown key is a normal state and yields an empty list.
    pub fn lookup(&self, attribute_key: &str) -> Vec<Arc<InvalidationStrategy>> {
        rw_read(&self.inner, SOURCE, "lookup")
            .registrations
            .iter()
            .filter(|reg| reg.strategy.attribute_key == attribute_key)
            .map(|reg| Arc::clone(&reg.strategy))
            .collect()
    }

    /// All attribute keys with at least one registered strategy.
    pub fn attributes(&self) -> HashSet<String> {
        rw_read(&self.inner, SOURCE, "attributes")
            .registrations
            .iter()
            .map(|reg| reg.strategy.attribute_key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.inner, SOURCE, "len").registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
