//! Connective terms
//!
//! Spoken connectives joining targets: ranges ("air past bat"), lists
//! ("air and bat"), swaps, and source/destination pairs.

use std::collections::BTreeMap;

use crate::overrides::{DefaultValues, OverrideError, OverrideStore, ReconcileOptions};
use crate::registry::ListRegistry;

/// Identifier used when a range is spoken without an explicit connective.
pub const DEFAULT_RANGE_CONNECTIVE: &str = "rangeInclusive";

/// Default values for the `range_connective` category.
///
/// `rangeExcludingStart` ships disabled: its default spoken form is the
/// removal marker, so users opt in through the CSV.
pub fn range_connective_defaults() -> BTreeMap<String, String> {
    [
        ("rangeExclusive", "between"),
        ("rangeInclusive", "past"),
        ("rangeExcludingStart", "-"),
        ("rangeExcludingEnd", "until"),
    ]
    .into_iter()
    .map(|(identifier, spoken)| (identifier.to_string(), spoken.to_string()))
    .collect()
}

/// All connective categories for the `target_connectives` store.
pub fn connective_defaults() -> DefaultValues {
    let mut defaults = DefaultValues::new();
    defaults.insert("range_connective".to_string(), range_connective_defaults());
    defaults.insert(
        "list_connective".to_string(),
        BTreeMap::from([("listConnective".to_string(), "and".to_string())]),
    );
    defaults.insert(
        "swap_connective".to_string(),
        BTreeMap::from([("swapConnective".to_string(), "with".to_string())]),
    );
    defaults.insert(
        "source_destination_connective".to_string(),
        BTreeMap::from([("sourceDestinationConnective".to_string(), "to".to_string())]),
    );
    defaults
}

/// Reconcile the connective store and publish its lists.
pub fn initialize_connectives(
    store: &OverrideStore,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    store.reconcile(
        "target_connectives",
        &connective_defaults(),
        &ReconcileOptions::default(),
        registry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_connective_is_a_default() {
        assert!(range_connective_defaults().contains_key(DEFAULT_RANGE_CONNECTIVE));
    }

    #[test]
    fn test_excluding_start_ships_disabled() {
        let defaults = range_connective_defaults();
        assert_eq!(defaults.get("rangeExcludingStart").unwrap(), "-");
    }

    #[test]
    fn test_all_categories_present() {
        let defaults = connective_defaults();
        for category in [
            "range_connective",
            "list_connective",
            "swap_connective",
            "source_destination_connective",
        ] {
            assert!(defaults.contains_key(category), "missing {category}");
        }
    }
}
