//! Entity filter
//!
//! Selects entity names from a primary dictionary by tag class.

use crate::document::{tag_class, Record};
use serde_json::Value;

/// Check if a value is a mapping tagged with one of `classes`
#[must_use]
pub fn is_class(value: &Value, classes: &[&str]) -> bool {
    value
        .as_object()
        .and_then(tag_class)
        .is_some_and(|class| classes.contains(&class))
}

/// Names of entities tagged with one of `classes`, ascending
///
/// Records without a tag, or that are not mappings, never match.
#[must_use]
pub fn matching(primary: &Record, classes: &[&str]) -> Vec<String> {
    // Map iteration is already ordered by key
    primary
        .iter()
        .filter(|(_, record)| is_class(record, classes))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn primary() -> Record {
        match json!({
            "q2": {"x__class__": "Qubit"},
            "m1": {"x__class__": "Measurement"},
            "q1": {"__class__": "Qubit"},
            "untagged": {"physChan": "q1-phys"},
            "scalar": 3,
            "odd": {"x__class__": "qubit"}
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn matches_in_name_order() {
        assert_eq!(matching(&primary(), &["Qubit"]), vec!["q1", "q2"]);
        assert_eq!(matching(&primary(), &["Qubit", "Measurement"]), vec!["m1", "q1", "q2"]);
    }

    #[test]
    fn exact_equality_only() {
        assert!(matching(&primary(), &["QUBIT"]).is_empty());
        assert_eq!(matching(&primary(), &["qubit"]), vec!["odd"]);
    }

    #[test]
    fn no_classes_no_matches() {
        assert!(matching(&primary(), &[]).is_empty());
    }

    #[test]
    fn deterministic() {
        let primary = primary();
        assert_eq!(matching(&primary, &["Qubit"]), matching(&primary, &["Qubit"]));
    }

    #[test]
    fn is_class_rejects_non_mappings() {
        assert!(!is_class(&json!("Qubit"), &["Qubit"]));
        assert!(!is_class(&json!({"x__class__": null}), &["Qubit"]));
        assert!(is_class(&json!({"x__class__": "X6"}), &["X6"]));
    }
}
