//! Editing actions and dispatch
//!
//! Default spoken forms for the editing actions, the instruction variants
//! the grammar layer produces, and dispatch into the host execution API.
//! The tables here are data; customize spoken forms through the CSVs.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::overrides::{DefaultValues, OverrideError, OverrideStore, ReconcileOptions};
use crate::registry::ListRegistry;

/// A dispatchable instruction resolved from a grammar match.
///
/// The grammar layer selects the variant when it builds the match result;
/// nothing downstream probes for optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionInstruction {
    /// Built-in editing action, by action identifier.
    SimpleAction(String),
    /// Action implemented by a plugin-side callback.
    CallbackAction(String),
    /// Arbitrary command forwarded to the companion editor.
    IdeCommand(String),
}

/// Host execution API the dispatcher drives.
pub trait CommandHost {
    /// Run an editing action on a target and wait for completion.
    fn run_action(&mut self, action_id: &str, target: &Value);
    /// Fire an editing action without awaiting the host round-trip.
    fn run_action_no_wait(&mut self, action_id: &str, target: &Value);
    /// Invoke a plugin-side callback action.
    fn run_callback(&mut self, action_id: &str, target: &Value);
    /// Forward a command to the companion editor.
    fn run_ide_command(&mut self, command_id: &str, target: &Value);
}

/// Actions fired without awaiting the host round-trip; they scroll or
/// otherwise have no result worth blocking on.
const NO_WAIT_ACTIONS: &[&str] = &[
    "editNewLineAfter",
    "scrollToBottom",
    "scrollToCenter",
    "scrollToTop",
];

/// Settle time after a no-wait dispatch, where the host needs the editor
/// to finish before the next command lands.
fn post_dispatch_sleep(action_id: &str) -> Option<Duration> {
    match action_id {
        "editNewLineAfter" => Some(Duration::from_millis(300)),
        _ => None,
    }
}

/// Route one instruction into the host.
pub fn dispatch(host: &mut dyn CommandHost, instruction: &ActionInstruction, target: &Value) {
    match instruction {
        ActionInstruction::SimpleAction(id) if NO_WAIT_ACTIONS.contains(&id.as_str()) => {
            host.run_action_no_wait(id, target);
            if let Some(delay) = post_dispatch_sleep(id) {
                thread::sleep(delay);
            }
        }
        ActionInstruction::SimpleAction(id) => host.run_action(id, target),
        ActionInstruction::CallbackAction(id) => host.run_callback(id, target),
        ActionInstruction::IdeCommand(id) => host.run_ide_command(id, target),
    }
}

/// Default spoken forms for the simple editing actions.
pub fn simple_action_defaults() -> BTreeMap<String, String> {
    [
        ("clearAndSetSelection", "change"),
        ("copyToClipboard", "copy"),
        ("cutToClipboard", "carve"),
        ("editNewLineAfter", "drink"),
        ("editNewLineBefore", "pour"),
        ("extractVariable", "extract"),
        ("foldRegion", "fold"),
        ("remove", "chuck"),
        ("scrollToBottom", "bottom"),
        ("scrollToCenter", "center"),
        ("scrollToTop", "crown"),
        ("setSelection", "take"),
        ("setSelectionAfter", "post"),
        ("setSelectionBefore", "pre"),
        ("swapTargets", "swap"),
        ("unfoldRegion", "unfold"),
    ]
    .into_iter()
    .map(|(identifier, spoken)| (identifier.to_string(), spoken.to_string()))
    .collect()
}

/// Default spoken forms for actions that take a position ("paste below X").
pub fn positional_action_defaults() -> BTreeMap<String, String> {
    [
        ("moveToTarget", "move"),
        ("pasteFromClipboard", "paste"),
        ("replaceWithTarget", "bring"),
    ]
    .into_iter()
    .map(|(identifier, spoken)| (identifier.to_string(), spoken.to_string()))
    .collect()
}

/// Default spoken forms for plugin-side callback actions.
pub fn callback_action_defaults() -> BTreeMap<String, String> {
    [
        ("findInDocument", "scout"),
        ("findInWorkspace", "scout all"),
        ("nextHomophone", "phones"),
        ("toggleBreakpoint", "break point"),
    ]
    .into_iter()
    .map(|(identifier, spoken)| (identifier.to_string(), spoken.to_string()))
    .collect()
}

/// Reconcile the action stores and publish their lists.
///
/// Built-in actions share one file; user-defined editor commands get their
/// own, where any identifier is accepted and lands in `custom_action`.
pub fn initialize_actions(
    store: &OverrideStore,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    let mut defaults = DefaultValues::new();
    defaults.insert("simple_action".to_string(), simple_action_defaults());
    defaults.insert("positional_action".to_string(), positional_action_defaults());
    defaults.insert("callback_action".to_string(), callback_action_defaults());
    let options = ReconcileOptions {
        // `deleteLine` predates `remove`; tolerate it in user files.
        extra_ignored_values: vec!["deleteLine".to_string()],
        ..Default::default()
    };
    store.reconcile("actions", &defaults, &options, registry)?;

    let mut custom = DefaultValues::new();
    custom.insert("custom_action".to_string(), BTreeMap::new());
    let options = ReconcileOptions {
        allow_unknown_values: true,
        default_category: Some("custom_action".to_string()),
        ..Default::default()
    };
    store.reconcile("custom_actions", &custom, &options, registry)
}
