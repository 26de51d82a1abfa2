//! Full-clear decision.
//!
//! An invalidation request that cannot be mapped to specific paths, or that
//! explicitly asks for it, fails safe toward over-invalidation: one purge
//! of the store's base path instead of resolver-level granularity. The
//! decision is made once, before any resolver runs.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::domain::{ChangeNotification, PropertyValue, StoreContext};

/// Why a pass short-circuited to a full clear. The external effect is the
/// same for every reason; the reason is diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FullClearReason {
    /// The notification carried the explicit clear-everything flag.
    ExplicitFlag,
    /// A required correlating property is missing or malformed.
    MalformedProperty(String),
    /// The store path does not resolve to a commerce binding.
    UnknownStore,
    /// Extraction left no dispatcher-relevant attributes.
    NoRelevantAttributes,
}

impl fmt::Display for FullClearReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitFlag => f.write_str("explicit flag"),
            Self::MalformedProperty(name) => write!(f, "malformed property `{name}`"),
            Self::UnknownStore => f.write_str("unresolved store binding"),
            Self::NoRelevantAttributes => f.write_str("no relevant attributes"),
        }
    }
}

/// Well-formedness requirement for one correlating property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCheck {
    NonEmptyText,
    NonEmptyList,
}

impl ValueCheck {
    fn accepts(self, value: &PropertyValue) -> bool {
        match (self, value) {
            (Self::NonEmptyText, PropertyValue::Text(_))
            | (Self::NonEmptyList, PropertyValue::List(_)) => !value.is_empty(),
            _ => false,
        }
    }
}

/// Decides whether a notification is too broad or too ambiguous to reason
/// about incrementally.
pub struct FullClearDecider {
    /// Required correlating properties and their shape checks, consulted in
    /// order. Supplied at construction; no runtime dispatch by name.
    required: Vec<(String, ValueCheck)>,
}

impl FullClearDecider {
    pub fn new(required: Vec<(String, ValueCheck)>) -> Self {
        Self { required }
    }

    /// First matching rule wins:
    /// 1. explicit flag, 2. missing/unresolvable correlating data,
    /// 3. malformed required property, 4. empty extraction.
    pub fn evaluate(
        &self,
        notification: &ChangeNotification,
        store: Option<&StoreContext>,
        extracted: &HashMap<String, Vec<String>>,
    ) -> Option<FullClearReason> {
        if notification.full_clear {
            return Some(FullClearReason::ExplicitFlag);
        }

        if notification.store_path.trim().is_empty() {
            return Some(FullClearReason::MalformedProperty("storePath".to_string()));
        }

        let Some(store) = store else {
            return Some(FullClearReason::UnknownStore);
        };
        if store.client_id.trim().is_empty() {
            debug!(
                store_path = %store.store_path,
                "store binding has no catalog client id"
            );
            return Some(FullClearReason::UnknownStore);
        }

        for (name, check) in &self.required {
            match notification.attributes.get(name) {
                Some(value) if check.accepts(value) => {}
                _ => {
                    return Some(FullClearReason::MalformedProperty(name.clone()));
                }
            }
        }

        if extracted.is_empty() {
            return Some(FullClearReason::NoRelevantAttributes);
        }

        None
    }
}

impl Default for FullClearDecider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store::test_context;

    fn extracted_skus() -> HashMap<String, Vec<String>> {
        HashMap::from([("productSkus".to_string(), vec!["SKU1".to_string()])])
    }

    #[test]
    fn explicit_flag_wins_first() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("/content/site/en").with_full_clear();
        let ctx = test_context();

        assert_eq!(
            decider.evaluate(&notification, Some(&ctx), &extracted_skus()),
            Some(FullClearReason::ExplicitFlag)
        );
    }

    #[test]
    fn blank_store_path_is_malformed() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("   ");

        assert_eq!(
            decider.evaluate(&notification, None, &extracted_skus()),
            Some(FullClearReason::MalformedProperty("storePath".to_string()))
        );
    }

    #[test]
    fn unresolved_store_clears_fully() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("/content/unknown/xx");

        assert_eq!(
            decider.evaluate(&notification, None, &extracted_skus()),
            Some(FullClearReason::UnknownStore)
        );
    }

    #[test]
    fn blank_client_id_counts_as_unresolved() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("/content/site/en");
        let mut ctx = test_context();
        ctx.client_id = String::new();

        assert_eq!(
            decider.evaluate(&notification, Some(&ctx), &extracted_skus()),
            Some(FullClearReason::UnknownStore)
        );
    }

    #[test]
    fn required_property_checks_run_in_order() {
        let decider = FullClearDecider::new(vec![(
            "changeType".to_string(),
            ValueCheck::NonEmptyText,
        )]);
        let ctx = test_context();

        let missing = ChangeNotification::new("/content/site/en");
        assert_eq!(
            decider.evaluate(&missing, Some(&ctx), &extracted_skus()),
            Some(FullClearReason::MalformedProperty("changeType".to_string()))
        );

        let wrong_shape = ChangeNotification::new("/content/site/en")
            .with_attribute("changeType", vec!["update".to_string()]);
        assert_eq!(
            decider.evaluate(&wrong_shape, Some(&ctx), &extracted_skus()),
            Some(FullClearReason::MalformedProperty("changeType".to_string()))
        );

        let mut well_formed = ChangeNotification::new("/content/site/en");
        well_formed.attributes.insert(
            "changeType".to_string(),
            PropertyValue::Text("update".to_string()),
        );
        assert_eq!(
            decider.evaluate(&well_formed, Some(&ctx), &extracted_skus()),
            None
        );
    }

    #[test]
    fn empty_extraction_clears_fully() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("/content/site/en");
        let ctx = test_context();

        assert_eq!(
            decider.evaluate(&notification, Some(&ctx), &HashMap::new()),
            Some(FullClearReason::NoRelevantAttributes)
        );
    }

    #[test]
    fn well_formed_notification_resolves_incrementally() {
        let decider = FullClearDecider::default();
        let notification = ChangeNotification::new("/content/site/en")
            .with_attribute("productSkus", vec!["SKU1".to_string()]);
        let ctx = test_context();

        assert_eq!(
            decider.evaluate(&notification, Some(&ctx), &extracted_skus()),
            None
        );
    }
}
