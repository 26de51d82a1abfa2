//! Invalidation service.
//!
//! Runs one pass per change notification: decide whether a full clear is
//! the only safe answer; otherwise resolve affected paths per attribute
//! (siblings concurrently, so a slow backend stalls only its own
//! attribute), merge, reduce to the minimal covering set, and purge each
//! surviving path. The pass is fire-and-forget: every failure mode
//! degrades toward "purge more" or "purge less but keep going", and
//! `process` never fails the caller.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::decider::{FullClearDecider, FullClearReason};
use super::extractor::AttributeExtractor;
use super::registry::StrategyRegistry;
use super::resolver::validated_patterns;
use super::strategy::StrategyKind;
use crate::domain::{ChangeNotification, StoreContext, StoreRegistry, paths};
use crate::engine::ports::FlushTransport;

const METRIC_PASS_MS: &str = "scopa_invalidation_pass_ms";
const METRIC_FLUSH_TOTAL: &str = "scopa_purge_flush_total";
const METRIC_FLUSH_FAILED: &str = "scopa_purge_flush_failed_total";
const METRIC_FULL_CLEAR: &str = "scopa_full_clear_total";
const METRIC_RESOLVED_PATHS: &str = "scopa_resolved_paths";

/// How a pass concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass short-circuited to one purge of the store base path.
    FullClear { reason: FullClearReason },
    /// Paths were resolved and reduced attribute by attribute.
    Resolved,
}

/// Result of one invalidation pass, for logging and embedding callers.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub pass_id: Uuid,
    pub store_path: String,
    pub outcome: PassOutcome,
    /// The reduced purge target set, in flush order.
    pub targets: Vec<String>,
    pub flushed: usize,
    pub failed: usize,
    /// Validated regex patterns for the repository-level surface; never
    /// expanded to paths here.
    pub pattern_invalidations: Vec<String>,
}

pub struct InvalidationService {
    registry: Arc<StrategyRegistry>,
    stores: Arc<StoreRegistry>,
    extractor: AttributeExtractor,
    decider: FullClearDecider,
    flush: Arc<dyn FlushTransport>,
}

impl InvalidationService {
    pub fn new(
        registry: Arc<StrategyRegistry>,
        stores: Arc<StoreRegistry>,
        decider: FullClearDecider,
        flush: Arc<dyn FlushTransport>,
    ) -> Self {
        let extractor = AttributeExtractor::new(Arc::clone(&registry));
        Self {
            registry,
            stores,
            extractor,
            decider,
            flush,
        }
    }

    /// Run one invalidation pass.
    #[instrument(skip(self, notification), fields(store_path = %notification.store_path))]
    pub async fn process(&self, notification: &ChangeNotification) -> PurgeReport {
        let started_at = Instant::now();
        let pass_id = Uuid::new_v4();
        let store = self.stores.resolve(&notification.store_path);
        let extracted = self.extractor.extract(notification);
        let pattern_invalidations = self.collect_patterns(notification);

        let decision = self.decider.evaluate(notification, store, &extracted);

        let report = match (decision, store) {
            (None, Some(store)) => {
                let resolved = self.resolve_all(store, &extracted).await;
                histogram!(METRIC_RESOLVED_PATHS).record(resolved.len() as f64);

                let targets = super::reducer::reduce(&resolved, store.base_path());
                let (flushed, failed) = self.flush_all(&targets).await;
                PurgeReport {
                    pass_id,
                    store_path: notification.store_path.clone(),
                    outcome: PassOutcome::Resolved,
                    targets,
                    flushed,
                    failed,
                    pattern_invalidations,
                }
            }
            (decision, store) => {
                let reason = decision.unwrap_or(FullClearReason::UnknownStore);
                let base = store
                    .map(|ctx| ctx.base_path().to_string())
                    .unwrap_or_else(|| paths::normalize(&notification.store_path));
                counter!(METRIC_FULL_CLEAR).increment(1);
                info!(
                    pass_id = %pass_id,
                    reason = %reason,
                    base_path = %base,
                    "full clear decided before resolution"
                );
                let (targets, flushed, failed) = if base.is_empty() {
                    warn!(pass_id = %pass_id, "full clear has no usable base path; skipping purge");
                    (Vec::new(), 0, 0)
                } else {
                    let (flushed, failed) = self.flush_all(std::slice::from_ref(&base)).await;
                    (vec![base], flushed, failed)
                };
                PurgeReport {
                    pass_id,
                    store_path: notification.store_path.clone(),
                    outcome: PassOutcome::FullClear { reason },
                    targets,
                    flushed,
                    failed,
                    pattern_invalidations,
                }
            }
        };

        histogram!(METRIC_PASS_MS).record(started_at.elapsed().as_millis() as f64);
        info!(
            pass_id = %pass_id,
            outcome = ?report.outcome,
            targets = report.targets.len(),
            flushed = report.flushed,
            failed = report.failed,
            "invalidation pass completed"
        );
        report
    }

    /// Resolve every extracted attribute concurrently and merge the results.
    async fn resolve_all(
        &self,
        store: &StoreContext,
        extracted: &HashMap<String, Vec<String>>,
    ) -> HashSet<String> {
        let mut jobs = Vec::new();
        for (attribute, values) in extracted {
            for strategy in self.registry.lookup(attribute) {
                if let Some(resolver) = strategy.resolver() {
                    let resolver = Arc::clone(resolver);
                    jobs.push(async move { resolver.resolve(store, values).await });
                }
            }
        }

        let mut merged = HashSet::new();
        for resolved in futures::future::join_all(jobs).await {
            merged.extend(resolved.into_iter().map(|path| paths::normalize(&path)));
        }
        merged
    }

    /// Pattern-strategy values for the repository-level surface, validated.
    fn collect_patterns(&self, notification: &ChangeNotification) -> Vec<String> {
        let mut patterns = Vec::new();
        for attribute in self.registry.attributes() {
            let pattern_registered = self
                .registry
                .lookup(&attribute)
                .iter()
                .any(|strategy| matches!(strategy.kind, StrategyKind::Pattern));
            if !pattern_registered {
                continue;
            }
            if let Some(values) = notification.values_for(&attribute) {
                patterns.extend(validated_patterns(&values));
            }
        }
        patterns
    }

    /// Purge each target independently; a failed path never blocks the rest.
    async fn flush_all(&self, targets: &[String]) -> (usize, usize) {
        let mut flushed = 0;
        let mut failed = 0;
        for target in targets {
            counter!(METRIC_FLUSH_TOTAL).increment(1);
            match self.flush.flush(target).await {
                Ok(()) => {
                    flushed += 1;
                }
                Err(error) => {
                    failed += 1;
                    counter!(METRIC_FLUSH_FAILED).increment(1);
                    warn!(path = %target, error = %error, "purge failed; continuing");
                }
            }
        }
        (flushed, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store::test_context;
    use crate::domain::{FlushError, StoreContext};
    use crate::engine::decider::FullClearDecider;
    use crate::engine::resolver::PathResolver;
    use crate::engine::strategy::InvalidationStrategy;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticResolver {
        resolved: HashSet<String>,
    }

    #[async_trait]
    impl PathResolver for StaticResolver {
        async fn resolve(&self, _store: &StoreContext, _values: &[String]) -> HashSet<String> {
            self.resolved.clone()
        }
    }

    #[derive(Default)]
    struct RecordingFlush {
        calls: Mutex<Vec<String>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl FlushTransport for RecordingFlush {
        async fn flush(&self, path: &str) -> Result<(), FlushError> {
            self.calls
                .lock()
                .expect("flush recorder lock")
                .push(path.to_string());
            if self.reject.as_deref() == Some(path) {
                return Err(FlushError::Rejected {
                    path: path.to_string(),
                    status: 503,
                });
            }
            Ok(())
        }
    }

    fn service_with(
        resolved: &[(&str, &[&str])],
        flush: Arc<RecordingFlush>,
    ) -> InvalidationService {
        let registry = Arc::new(StrategyRegistry::new());
        for (attribute, resolver_paths) in resolved {
            registry.register(
                InvalidationStrategy::path(
                    *attribute,
                    None,
                    Arc::new(StaticResolver {
                        resolved: resolver_paths.iter().map(|p| (*p).to_string()).collect(),
                    }),
                ),
                format!("test.{attribute}"),
            );
        }
        registry.register(InvalidationStrategy::pattern("regexPatterns"), "test.regex");

        let stores = Arc::new(StoreRegistry::new([test_context()]));
        InvalidationService::new(registry, stores, FullClearDecider::default(), flush)
    }

    #[tokio::test]
    async fn explicit_full_clear_skips_resolvers_and_purges_base() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(
            &[("productSkus", &["/content/site/en/should-not-appear"])],
            Arc::clone(&flush),
        );

        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()])
            .with_full_clear();
        let report = service.process(&notification).await;

        assert_eq!(
            report.outcome,
            PassOutcome::FullClear {
                reason: FullClearReason::ExplicitFlag
            }
        );
        assert_eq!(report.targets, vec!["/content/site/en".to_string()]);
        assert_eq!(
            *flush.calls.lock().expect("flush recorder lock"),
            vec!["/content/site/en".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_store_purges_notification_path() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(&[("productSkus", &[])], Arc::clone(&flush));

        let notification = ChangeNotification::new("/content/other/fr")
            .with_attribute("productSkus", vec!["SKU1".to_string()]);
        let report = service.process(&notification).await;

        assert_eq!(
            report.outcome,
            PassOutcome::FullClear {
                reason: FullClearReason::UnknownStore
            }
        );
        assert_eq!(report.targets, vec!["/content/other/fr".to_string()]);
    }

    #[tokio::test]
    async fn blank_store_path_skips_purge_entirely() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(&[("productSkus", &[])], Arc::clone(&flush));

        let notification = ChangeNotification::new("   ")
            .with_attribute("productSkus", vec!["SKU1".to_string()]);
        let report = service.process(&notification).await;

        assert_eq!(
            report.outcome,
            PassOutcome::FullClear {
                reason: FullClearReason::MalformedProperty("storePath".to_string())
            }
        );
        assert!(report.targets.is_empty());
        assert_eq!(report.flushed, 0);
        assert_eq!(report.failed, 0);
        assert!(flush.calls.lock().expect("flush recorder lock").is_empty());
    }

    #[tokio::test]
    async fn resolved_paths_are_reduced_before_flushing() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(
            &[
                ("productSkus", &["/content/site/en/about"]),
                ("categoryUids", &["/content/site/en/about/team"]),
            ],
            Arc::clone(&flush),
        );

        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()])
            .with_attribute("categoryUids", vec!["abc".to_string()]);
        let report = service.process(&notification).await;

        assert_eq!(report.outcome, PassOutcome::Resolved);
        assert_eq!(report.targets, vec!["/content/site/en/about".to_string()]);
        assert_eq!(report.flushed, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn flush_failure_does_not_abort_remaining_paths() {
        let flush = Arc::new(RecordingFlush {
            calls: Mutex::new(Vec::new()),
            reject: Some("/content/site/en/b".to_string()),
        });
        let service = service_with(
            &[(
                "productSkus",
                &[
                    "/content/site/en/a",
                    "/content/site/en/b",
                    "/content/site/en/c",
                ],
            )],
            Arc::clone(&flush),
        );

        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()]);
        let report = service.process(&notification).await;

        assert_eq!(report.flushed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(flush.calls.lock().expect("flush recorder lock").len(), 3);
    }

    #[tokio::test]
    async fn same_notification_twice_yields_same_targets() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(
            &[(
                "productSkus",
                &["/content/site/en/x", "/content/site/en/x/y"],
            )],
            Arc::clone(&flush),
        );

        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()]);
        let first = service.process(&notification).await;
        let second = service.process(&notification).await;

        assert_eq!(first.targets, second.targets);
        assert_eq!(first.targets, vec!["/content/site/en/x".to_string()]);
    }

    #[tokio::test]
    async fn pattern_values_are_validated_and_carried_not_flushed() {
        let flush = Arc::new(RecordingFlush::default());
        let service = service_with(
            &[("productSkus", &["/content/site/en/p"])],
            Arc::clone(&flush),
        );

        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()])
            .with_attribute(
                "regexPatterns",
                vec!["valid.*".to_string(), "(".to_string()],
            );
        let report = service.process(&notification).await;

        assert_eq!(report.pattern_invalidations, vec!["valid.*".to_string()]);
        assert_eq!(report.targets, vec!["/content/site/en/p".to_string()]);
    }
}
