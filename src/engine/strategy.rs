//! Strategy model.
//!
//! A strategy binds one attribute key to an invalidation capability. The
//! path-resolving strategies expand changed values into cached page paths;
//! the pattern strategy carries ready-made regex patterns for the
//! repository-level invalidation surface and never resolves paths, so it is
//! a distinct variant rather than a degenerate resolver.

use std::sync::Arc;

use super::resolver::PathResolver;

/// What a strategy does with its attribute's changed values.
#[derive(Clone)]
pub enum StrategyKind {
    /// Expand values into purge paths for the dispatcher surface.
    Path(Arc<dyn PathResolver>),
    /// Values are literal regex patterns matched against cached response
    /// bodies by the repository-level surface; excluded from path purge.
    Pattern,
}

impl std::fmt::Debug for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(_) => f.write_str("Path"),
            Self::Pattern => f.write_str("Pattern"),
        }
    }
}

/// A named invalidation capability bound to exactly one attribute key.
#[derive(Debug, Clone)]
pub struct InvalidationStrategy {
    /// Attribute key this strategy consumes (registry key).
    pub attribute_key: String,
    /// Advisory regex for detecting relevant data in cached response
    /// bodies; not used for path resolution.
    pub match_pattern: Option<String>,
    pub kind: StrategyKind,
}

impl InvalidationStrategy {
    pub fn path(
        attribute_key: impl Into<String>,
        match_pattern: Option<String>,
        resolver: Arc<dyn PathResolver>,
    ) -> Self {
        Self {
            attribute_key: attribute_key.into(),
            match_pattern,
            kind: StrategyKind::Path(resolver),
        }
    }

    pub fn pattern(attribute_key: impl Into<String>) -> Self {
        Self {
            attribute_key: attribute_key.into(),
            match_pattern: None,
            kind: StrategyKind::Pattern,
        }
    }

    /// True for strategies that participate in dispatcher path purge.
    pub fn resolves_paths(&self) -> bool {
        matches!(self.kind, StrategyKind::Path(_))
    }

    pub fn resolver(&self) -> Option<&Arc<dyn PathResolver>> {
        match &self.kind {
            StrategyKind::Path(resolver) => Some(resolver),
            StrategyKind::Pattern => None,
        }
    }
}
