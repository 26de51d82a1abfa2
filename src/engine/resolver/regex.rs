//! Regex pattern strategy support.
//!
//! The pattern strategy performs no lookup: its changed values are the
//! literal regex patterns the repository-level surface matches against
//! cached response bodies. It is registered as `StrategyKind::Pattern` and
//! never enters the dispatcher path pipeline; the only processing it gets
//! is validation, so a malformed pattern is dropped before it reaches the
//! transport layer.

use regex::Regex;
use tracing::warn;

/// Keep the values that compile as regex patterns, preserving order.
pub fn validated_patterns(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter(|value| !value.trim().is_empty())
        .filter(|value| match Regex::new(value) {
            Ok(_) => true,
            Err(error) => {
                warn!(pattern = %value, error = %error, "dropping invalid regex pattern");
                false
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_patterns_pass_through_in_order() {
        let values = vec![
            r#"\"sku\":\s*\"SKU1\""#.to_string(),
            "cache-key-[0-9]+".to_string(),
        ];
        assert_eq!(validated_patterns(&values), values);
    }

    #[test]
    fn invalid_and_blank_patterns_are_dropped() {
        let values = vec![
            "(".to_string(),
            "   ".to_string(),
            "valid.*".to_string(),
        ];
        assert_eq!(validated_patterns(&values), vec!["valid.*".to_string()]);
    }
}
