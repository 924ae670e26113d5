//! Scope types
//!
//! Spoken forms for syntactic scopes. The pluralized list backs
//! "every"-style commands ("take funks").

use std::collections::BTreeMap;

use crate::overrides::{DefaultValues, OverrideError, OverrideStore, ReconcileOptions};
use crate::registry::ListRegistry;

/// Default spoken forms for the `scope_type` category.
pub fn scope_type_defaults() -> BTreeMap<String, String> {
    [
        ("argumentOrParameter", "arg"),
        ("className", "class name"),
        ("class", "class"),
        ("collectionItem", "item"),
        ("collectionKey", "key"),
        ("comment", "comment"),
        ("functionCall", "call"),
        ("ifStatement", "if state"),
        ("namedFunction", "funk"),
        ("statement", "state"),
        ("string", "string"),
        ("value", "value"),
    ]
    .into_iter()
    .map(|(identifier, spoken)| (identifier.to_string(), spoken.to_string()))
    .collect()
}

/// Reconcile the scope-type store, publishing the singular and plural lists.
pub fn initialize_scope_types(
    store: &OverrideStore,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    let mut defaults = DefaultValues::new();
    defaults.insert("scope_type".to_string(), scope_type_defaults());
    let options = ReconcileOptions {
        pluralize_categories: vec!["scope_type".to_string()],
        ..Default::default()
    };
    store.reconcile("scope_types", &defaults, &options, registry)
}
