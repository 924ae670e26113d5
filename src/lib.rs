//! Phrasebook - spoken-form customization and command dispatch for
//! voice-driven editing
//!
//! Runs as a plugin inside a speech-recognition host. Spoken phrases map to
//! stable command identifiers through per-category lookup lists; users
//! customize the phrases through CSV files that survive upgrades. The host
//! calls [`initialize`] once at startup, before the grammar engine needs
//! the lists; nothing runs implicitly on load.

pub mod actions;
pub mod companion;
pub mod connective;
pub mod inflect;
pub mod marks;
pub mod overrides;
pub mod registry;
pub mod scopes;

pub use overrides::{DefaultValues, OverrideError, OverrideStore, ReconcileOptions};
pub use registry::{ListRegistry, MemoryRegistry};

/// Run every built-in reconciliation once and publish the resulting lists.
///
/// Invoked by the host's startup sequence. Each store performs a one-shot
/// synchronous read (and possible append) of its backing file; to pick up
/// an external edit to the settings directory, call again.
pub fn initialize(
    store: &OverrideStore,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    actions::initialize_actions(store, registry)?;
    connective::initialize_connectives(store, registry)?;
    marks::initialize_line_directions(store, registry)?;
    scopes::initialize_scope_types(store, registry)?;
    tracing::info!(
        "Spoken-form lists initialized from {}",
        store.settings_dir().display()
    );
    Ok(())
}
