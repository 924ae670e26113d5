//! Line-number marks
//!
//! Spoken directions for addressing lines: "row" speaks the last two digits
//! of an absolute line number, "up"/"down" count from the cursor. Each
//! direction pairs a customizable spoken form with a stable identifier and
//! a number formatter.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::overrides::{DefaultValues, OverrideError, OverrideStore, ReconcileOptions};
use crate::registry::ListRegistry;

/// How a spoken number is interpreted for a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineNumberKind {
    /// Last two digits of the absolute line number.
    Modulo100,
    /// Offset relative to the cursor line.
    Relative,
}

impl LineNumberKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Modulo100 => "modulo100",
            Self::Relative => "relative",
        }
    }
}

/// A customizable line-direction term.
#[derive(Debug)]
pub struct LineDirection {
    pub identifier: &'static str,
    pub default_spoken_form: &'static str,
    pub kind: LineNumberKind,
    formatter: fn(i32) -> i32,
}

impl LineDirection {
    /// Convert a spoken number to the payload value for this direction.
    pub fn format(&self, number: i32) -> i32 {
        (self.formatter)(number)
    }
}

/// The built-in directions. Customize spoken forms via the CSV, not here.
pub const LINE_DIRECTIONS: &[LineDirection] = &[
    LineDirection {
        identifier: "lineNumberModulo100",
        default_spoken_form: "row",
        kind: LineNumberKind::Modulo100,
        // spoken rows are one-based
        formatter: |number| number - 1,
    },
    LineDirection {
        identifier: "lineNumberRelativeUp",
        default_spoken_form: "up",
        kind: LineNumberKind::Relative,
        formatter: |number| -number,
    },
    LineDirection {
        identifier: "lineNumberRelativeDown",
        default_spoken_form: "down",
        kind: LineNumberKind::Relative,
        formatter: |number| number,
    },
];

/// Look up a direction by identifier.
pub fn find_direction(identifier: &str) -> Option<&'static LineDirection> {
    LINE_DIRECTIONS.iter().find(|d| d.identifier == identifier)
}

/// Default values for the `line_direction` category.
pub fn line_direction_defaults() -> BTreeMap<String, String> {
    LINE_DIRECTIONS
        .iter()
        .map(|d| (d.identifier.to_string(), d.default_spoken_form.to_string()))
        .collect()
}

/// Mark payload for a single spoken line number.
pub fn line_number_mark(direction: &LineDirection, number: i32) -> Value {
    json!({
        "type": "lineNumber",
        "lineNumberType": direction.kind.as_str(),
        "lineNumber": direction.format(number),
    })
}

/// Mark payload for a line or line range.
pub fn line_number_target(direction: &LineDirection, first: i32, second: Option<i32>) -> Value {
    let anchor = line_number_mark(direction, first);
    match second {
        None => anchor,
        Some(second) => json!({
            "type": "range",
            "anchor": anchor,
            "active": line_number_mark(direction, second),
        }),
    }
}

/// Reconcile the line-direction store and publish its list.
pub fn initialize_line_directions(
    store: &OverrideStore,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    let mut defaults = DefaultValues::new();
    defaults.insert("line_direction".to_string(), line_direction_defaults());
    store.reconcile("line_directions", &defaults, &ReconcileOptions::default(), registry)
}
