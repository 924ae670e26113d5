//! CSV-backed spoken-form customization
//!
//! Reconciles caller-supplied default spoken forms against user-editable
//! CSV files so commands can be renamed, aliased, or disabled without
//! touching code. Files live under `~/.phrasebook/settings/` and stay
//! hand-editable plain text; rows the user never touched pick up new
//! defaults automatically across upgrades.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::inflect::pluralize;
use crate::registry::ListRegistry;

/// Default header for the spoken-form column.
pub const SPOKEN_FORM_HEADER: &str = "Spoken form";

/// Default header for the identifier column.
pub const IDENTIFIER_HEADER: &str = "Command identifier";

/// Default values for one store: category -> identifier -> canonical spoken form.
pub type DefaultValues = BTreeMap<String, BTreeMap<String, String>>;

/// Override store error types.
///
/// File-content problems (malformed rows, unknown or duplicate identifiers)
/// are not errors at this level: they are logged, the offending rows are
/// dropped, and the merge still produces a table. A typo in the CSV must
/// never take the whole session down. Only contract violations and I/O
/// failures surface as `Err`.
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine home directory")]
    NoHomeDirectory,

    #[error("default identifier '{0}' is claimed by more than one category")]
    ConflictingDefault(String),

    #[error("allow_unknown_values requires a default_category")]
    MissingDefaultCategory,

    #[error("identifier '{0}' reached the merge phase unclassified")]
    UnclassifiedIdentifier(String),
}

/// Per-call reconciliation options.
///
/// Construct a fresh snapshot for every call; the store never retains one.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Expected header cells, in column order.
    pub headers: [String; 2],
    /// Identifiers dropped silently when they appear in the file. Kept for
    /// retired commands so stale user rows do not turn into errors.
    pub extra_ignored_values: Vec<String>,
    /// Accept identifiers that are not among the defaults.
    pub allow_unknown_values: bool,
    /// Category receiving unknown identifiers. Required when
    /// `allow_unknown_values` is set.
    pub default_category: Option<String>,
    /// Never create or append to the backing file.
    pub suppress_file_write: bool,
    /// Categories that also publish a `<name>_plural` derived table.
    pub pluralize_categories: Vec<String>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            headers: [SPOKEN_FORM_HEADER.to_string(), IDENTIFIER_HEADER.to_string()],
            extra_ignored_values: Vec::new(),
            allow_unknown_values: false,
            default_category: None,
            suppress_file_write: false,
            pluralize_categories: Vec::new(),
        }
    }
}

/// Store managing the CSV files in one settings directory.
///
/// Each [`reconcile`](OverrideStore::reconcile) call is a one-shot
/// synchronous pass: load or create the backing file, validate it against
/// the defaults, merge, publish. Nothing is cached between calls, so a host
/// that watches the settings directory can simply call again.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    settings_dir: PathBuf,
}

impl OverrideStore {
    pub fn new(settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_dir: settings_dir.into(),
        }
    }

    /// Store rooted at the standard location (`~/.phrasebook/settings`).
    pub fn default_location() -> Result<Self, OverrideError> {
        let home = dirs::home_dir().ok_or(OverrideError::NoHomeDirectory)?;
        Ok(Self::new(home.join(".phrasebook").join("settings")))
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Path of the backing file for a store name, `.csv` appended if absent.
    pub fn file_path(&self, name: &str) -> PathBuf {
        if name.ends_with(".csv") {
            self.settings_dir.join(name)
        } else {
            self.settings_dir.join(format!("{name}.csv"))
        }
    }

    /// Reconcile one named store and publish its category tables.
    ///
    /// Creates the backing file on first run, appends newly introduced
    /// defaults on later runs (unless the file has errors or writes are
    /// suppressed), and registers one list per category plus one per
    /// pluralized category.
    pub fn reconcile(
        &self,
        name: &str,
        default_values: &DefaultValues,
        options: &ReconcileOptions,
        registry: &mut dyn ListRegistry,
    ) -> Result<(), OverrideError> {
        if options.allow_unknown_values && options.default_category.is_none() {
            return Err(OverrideError::MissingDefaultCategory);
        }

        let path = self.file_path(name);
        fs::create_dir_all(&self.settings_dir)?;

        let disk_defaults = disk_view(default_values)?;

        if path.is_file() {
            let current = update_file(&path, &disk_defaults, options)?;
            merge(default_values, &current, options, registry)
        } else {
            if !options.suppress_file_write {
                create_file(&path, &options.headers, &disk_defaults)?;
            }
            merge(default_values, &disk_defaults, options, registry)
        }
    }
}

/// Leading `-` marks a key as removed: the identifier's spoken form is
/// suppressed rather than remapped.
fn is_removed(key: &str) -> bool {
    key.starts_with('-')
}

/// Flatten the caller's category tables into the disk-oriented view
/// (spoken form -> identifier), checking that no identifier is claimed by
/// more than one category.
fn disk_view(default_values: &DefaultValues) -> Result<BTreeMap<String, String>, OverrideError> {
    let mut seen = HashSet::new();
    let mut result = BTreeMap::new();
    for table in default_values.values() {
        for (identifier, spoken_form) in table {
            if !seen.insert(identifier.as_str()) {
                return Err(OverrideError::ConflictingDefault(identifier.clone()));
            }
            result.insert(spoken_form.clone(), identifier.clone());
        }
    }
    Ok(result)
}

/// Combine defaults with the on-disk records and publish the result.
///
/// The file's spoken form wins over the default for a known identifier.
/// Unknown identifiers were pre-filtered by the parser; one surfacing here
/// outside the ignore/allow paths is a contract violation and fails loudly.
fn merge(
    default_values: &DefaultValues,
    current: &BTreeMap<String, String>,
    options: &ReconcileOptions,
    registry: &mut dyn ListRegistry,
) -> Result<(), OverrideError> {
    // identifier -> (spoken-form key, category), seeded from the defaults
    let mut index: BTreeMap<String, (String, String)> = BTreeMap::new();
    for (category, table) in default_values {
        for (identifier, spoken_form) in table {
            index.insert(identifier.clone(), (spoken_form.clone(), category.clone()));
        }
    }

    for (key, identifier) in current {
        match index.entry(identifier.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().0 = key.clone(),
            Entry::Vacant(vacant) => {
                if options.extra_ignored_values.iter().any(|v| v == identifier) {
                    // retired identifier; drop silently
                } else if options.allow_unknown_values {
                    let category = options
                        .default_category
                        .clone()
                        .ok_or(OverrideError::MissingDefaultCategory)?;
                    vacant.insert((key.clone(), category));
                } else {
                    return Err(OverrideError::UnclassifiedIdentifier(identifier.clone()));
                }
            }
        }
    }

    // Group by category. A category whose every entry was removed still
    // publishes, as an empty table.
    let mut results: BTreeMap<&str, BTreeMap<String, String>> = BTreeMap::new();
    for (identifier, (key, category)) in &index {
        let table = results.entry(category.as_str()).or_default();
        if is_removed(key) {
            continue;
        }
        for alias in key.split('|') {
            table.insert(alias.trim().to_string(), identifier.clone());
        }
    }

    for (category, table) in &results {
        registry.register_list(category, table.clone());
        if options.pluralize_categories.iter().any(|c| c == category) {
            let plural = table
                .iter()
                .map(|(spoken_form, identifier)| (pluralize(spoken_form), identifier.clone()))
                .collect();
            registry.register_list(&format!("{category}_plural"), plural);
        }
    }

    Ok(())
}

/// Ensure the on-disk file knows every current default identifier.
///
/// Parses the file, and appends any defaults whose identifiers the file
/// does not use yet. Never writes on top of a file with parse errors.
/// Returns the pre-append key -> identifier mapping for the merge step.
fn update_file(
    path: &Path,
    disk_defaults: &BTreeMap<String, String>,
    options: &ReconcileOptions,
) -> Result<BTreeMap<String, String>, OverrideError> {
    let known: HashSet<&str> = disk_defaults.values().map(String::as_str).collect();
    let (current, has_errors) = read_file(
        path,
        &options.headers,
        &known,
        &options.extra_ignored_values,
        options.allow_unknown_values,
    )?;

    let used: HashSet<&str> = current.values().map(String::as_str).collect();
    let missing: BTreeMap<&String, &String> = disk_defaults
        .iter()
        .filter(|(_, identifier)| !used.contains(identifier.as_str()))
        .collect();

    if !missing.is_empty() {
        if has_errors {
            tracing::warn!(
                "New spoken forms are available for {} but the file has errors; fix them and re-run",
                path.display()
            );
        } else if options.suppress_file_write {
            tracing::info!(
                "New spoken forms are available for {} but file updates are disabled",
                path.display()
            );
        } else {
            append_missing(path, &missing)?;
        }
    }

    Ok(current)
}

/// Append a timestamped comment plus one row per missing default, then
/// echo each addition so the user knows what changed.
fn append_missing(path: &Path, missing: &BTreeMap<&String, &String>) -> Result<(), OverrideError> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut block = String::from("\n");
    block.push_str(&format!("# {timestamp} - new entries automatically added\n"));
    for (key, identifier) in missing {
        block.push_str(&create_line(key.as_str(), identifier.as_str()));
        block.push('\n');
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(block.as_bytes())?;

    tracing::info!("New spoken forms added to {}", path.display());
    for (key, identifier) in missing {
        tracing::info!("  {}: {}", key, identifier);
    }
    Ok(())
}

/// Write a fresh file: header row, defaults sorted by spoken form, trailing
/// newline.
fn create_file(
    path: &Path,
    headers: &[String; 2],
    disk_defaults: &BTreeMap<String, String>,
) -> Result<(), OverrideError> {
    let mut lines = Vec::with_capacity(disk_defaults.len() + 2);
    lines.push(create_line(&headers[0], &headers[1]));
    for (key, identifier) in disk_defaults {
        lines.push(create_line(key, identifier));
    }
    lines.push(String::new());
    fs::write(path, lines.join("\n"))?;
    tracing::info!("Created spoken-form file {}", path.display());
    Ok(())
}

/// Join two cells with `, `, quoting a cell only when it contains the
/// delimiter.
fn create_line(key: &str, identifier: &str) -> String {
    format!("{}, {}", quote_cell(key), quote_cell(identifier))
}

fn quote_cell(cell: &str) -> String {
    if cell.contains(',') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Report a recoverable file-content problem without aborting the read.
fn row_error(path: &Path, line: usize, message: &str, value: &str) {
    tracing::error!("{}:{}: {} '{}'", path.display(), line, message, value);
}

/// Read the two-column file into a key -> identifier mapping.
///
/// Blank lines and `#` comment lines are skipped. The first data row must
/// equal the expected headers; every later row must have exactly two cells,
/// a validated identifier, and a first claim on that identifier. Offending
/// rows are logged and dropped; the rest of the file still loads. Returns
/// the mapping and whether any row was rejected.
fn read_file(
    path: &Path,
    headers: &[String; 2],
    known_identifiers: &HashSet<&str>,
    extra_ignored: &[String],
    allow_unknown: bool,
) -> Result<(BTreeMap<String, String>, bool), OverrideError> {
    let contents = fs::read_to_string(path)?;

    let mut entries = BTreeMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut has_errors = false;
    let mut seen_header = false;

    for (index, line) in contents.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let cells = split_cells(line);

        if !seen_header {
            seen_header = true;
            if cells.as_slice() != headers.as_slice() {
                has_errors = true;
                row_error(path, number, "Malformed header", &cells.join(", "));
                tracing::error!("Expected '{}, {}'", headers[0], headers[1]);
            }
            continue;
        }

        if cells.len() != 2 {
            has_errors = true;
            row_error(
                path,
                number,
                "Malformed entry, expected 2 columns",
                &cells.join(", "),
            );
            continue;
        }

        let key = &cells[0];
        let identifier = &cells[1];

        if !known_identifiers.contains(identifier.as_str())
            && !extra_ignored.iter().any(|v| v == identifier)
            && !allow_unknown
        {
            has_errors = true;
            row_error(path, number, "Unknown identifier", identifier);
            continue;
        }

        if !used.insert(identifier.clone()) {
            has_errors = true;
            row_error(path, number, "Duplicate identifier", identifier);
            continue;
        }

        entries.insert(key.clone(), identifier.clone());
    }

    Ok((entries, has_errors))
}

/// Split one row into cells.
///
/// Whitespace after a delimiter is skipped so quoted cells can follow a
/// space (`key, "a, b"`); trailing whitespace is trimmed from every cell.
/// Doubled quotes inside a quoted cell become a literal quote.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut chars = line.chars().peekable();
    let mut first = true;

    loop {
        if !first {
            while chars.peek() == Some(&' ') {
                chars.next();
            }
        }
        first = false;

        let mut cell = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        break;
                    }
                } else {
                    cell.push(c);
                }
            }
            // Stray text between the closing quote and the delimiter is dropped.
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                chars.next();
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                cell.push(c);
                chars.next();
            }
        }

        cells.push(cell.trim_end().to_string());

        match chars.next() {
            Some(',') => continue,
            _ => break,
        }
    }

    cells
}
