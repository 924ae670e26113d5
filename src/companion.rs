//! Companion editor settings
//!
//! Locates and reads the companion editor's `settings.json`, used to keep
//! voice commands consistent with editor-side configuration. The file is
//! JSONC in practice; comments and trailing commas are tolerated.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Capability for locating the companion editor's settings file.
///
/// Business logic never branches on the operating system; it goes through
/// this seam, with the platform-aware implementation chosen at startup.
pub trait SettingsLocator {
    fn locate(&self) -> Result<PathBuf>;
}

/// Locator for the standard per-platform install locations.
///
/// Looks under the platform configuration directory (`~/.config`,
/// `~/Library/Application Support`, `%APPDATA%`) for the editor and its
/// open-source build, preferring the most recently modified settings file.
#[derive(Debug, Default)]
pub struct SystemLocator;

impl SettingsLocator for SystemLocator {
    fn locate(&self) -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("no configuration directory on this platform"))?;
        let candidates = [
            config_dir.join("Code").join("User").join("settings.json"),
            config_dir.join("VSCodium").join("User").join("settings.json"),
        ];
        pick_newest(&candidates).ok_or_else(|| anyhow!("no editor settings file found"))
    }
}

/// Pick the most recently modified existing path.
fn pick_newest(paths: &[PathBuf]) -> Option<PathBuf> {
    paths
        .iter()
        .filter_map(|path| {
            let modified = path.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path.clone())
}

/// Trailing commas before a closing brace or bracket.
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing-comma pattern must compile"));

/// Strip JSONC comments and trailing commas so `serde_json` can parse.
fn strip_jsonc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    TRAILING_COMMA.replace_all(&out, "$1").into_owned()
}

/// Read the whole settings document.
pub fn read_settings(locator: &dyn SettingsLocator) -> Result<Value> {
    let path = locator.locate()?;
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&strip_jsonc(&text))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Read one setting by key; absent keys are an error.
pub fn read_setting(locator: &dyn SettingsLocator, key: &str) -> Result<Value> {
    let settings = read_settings(locator)?;
    settings
        .get(key)
        .cloned()
        .ok_or_else(|| anyhow!("setting '{key}' is not defined"))
}

/// Read one setting, returning `default` when the key is absent.
pub fn read_setting_or(locator: &dyn SettingsLocator, key: &str, default: Value) -> Result<Value> {
    let settings = read_settings(locator)?;
    Ok(settings.get(key).cloned().unwrap_or(default))
}

/// Read one setting, falling back on any error.
///
/// Returns the fallback value and `true` when the lookup failed; the error
/// is logged, never raised, so voice commands keep working with degraded
/// settings instead of dying on a broken settings file.
pub fn read_setting_with_fallback(
    locator: &dyn SettingsLocator,
    key: &str,
    default: Value,
    fallback: Value,
    fallback_message: &str,
) -> (Value, bool) {
    match read_setting_or(locator, key, default) {
        Ok(value) => (value, false),
        Err(error) => {
            tracing::warn!("{fallback_message}: {error:#}");
            (fallback, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    /// Locator pinned to a fixed path.
    struct FixedLocator(PathBuf);

    impl SettingsLocator for FixedLocator {
        fn locate(&self) -> Result<PathBuf> {
            Ok(self.0.clone())
        }
    }

    fn write_settings(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("settings.json");
        fs::write(&path, contents).expect("failed to write settings");
        path
    }

    // =========================================================================
    // JSONC stripping tests
    // =========================================================================

    #[test]
    fn test_strip_line_comments() {
        let stripped = strip_jsonc("{\n  // comment\n  \"a\": 1\n}");
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_strip_block_comments() {
        let stripped = strip_jsonc("{ /* block */ \"a\": 1 }");
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_strip_trailing_commas() {
        let stripped = strip_jsonc("{\"a\": [1, 2,], \"b\": 3,}");
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], json!([1, 2]));
        assert_eq!(value["b"], 3);
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let stripped = strip_jsonc(r#"{"url": "https://example.com", "glob": "a/*b"}"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["glob"], "a/*b");
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let stripped = strip_jsonc(r#"{"a": "say \"hi\" // not a comment"}"#);
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], "say \"hi\" // not a comment");
    }

    // =========================================================================
    // Settings lookup tests
    // =========================================================================

    #[test]
    fn test_read_setting_present() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(temp.path(), r#"{"editor.fontSize": 14}"#);
        let locator = FixedLocator(path);

        let value = read_setting(&locator, "editor.fontSize").unwrap();
        assert_eq!(value, 14);
    }

    #[test]
    fn test_read_setting_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(temp.path(), "{}");
        let locator = FixedLocator(path);

        assert!(read_setting(&locator, "missing").is_err());
    }

    #[test]
    fn test_read_setting_or_uses_default() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(temp.path(), "{}");
        let locator = FixedLocator(path);

        let value = read_setting_or(&locator, "missing", json!("fallback")).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_fallback_on_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let locator = FixedLocator(temp.path().join("nonexistent.json"));

        let (value, failed) = read_setting_with_fallback(
            &locator,
            "any",
            json!(null),
            json!("safe"),
            "settings lookup failed",
        );
        assert!(failed);
        assert_eq!(value, "safe");
    }

    #[test]
    fn test_fallback_on_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(temp.path(), "{ not json at all");
        let locator = FixedLocator(path);

        let (value, failed) =
            read_setting_with_fallback(&locator, "any", json!(null), json!(7), "broken settings");
        assert!(failed);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_pick_newest_skips_missing_paths() {
        let temp = TempDir::new().unwrap();
        let existing = write_settings(temp.path(), "{}");
        let missing = temp.path().join("other.json");

        assert_eq!(pick_newest(&[missing, existing.clone()]), Some(existing));
    }

    #[test]
    fn test_pick_newest_none_when_nothing_exists() {
        let temp = TempDir::new().unwrap();
        assert_eq!(pick_newest(&[temp.path().join("a.json")]), None);
    }
}
