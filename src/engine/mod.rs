//! Dispatcher cache invalidation engine.
//!
//! Pipeline per change notification:
//!
//! notification → full-clear decision → (full clear at the store base
//! path) or (attribute extraction → per-attribute path resolution via the
//! strategy registry → union → reduction to the minimal covering set →
//! one purge call per surviving path).
//!
//! The engine owns no cached data; it only computes which externally
//! cached paths must be purged and performs the purge.

mod decider;
mod extractor;
mod lock;
pub mod ports;
mod registry;
mod reducer;
pub mod resolver;
mod service;
mod strategy;

pub use decider::{FullClearDecider, FullClearReason, ValueCheck};
pub use extractor::AttributeExtractor;
pub use reducer::reduce;
pub use registry::StrategyRegistry;
pub use resolver::{CategoryUidResolver, PathResolver, ProductSkuResolver};
pub use service::{InvalidationService, PassOutcome, PurgeReport};
pub use strategy::{InvalidationStrategy, StrategyKind};
