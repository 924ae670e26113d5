//! English pluralization for derived spoken-form lists
//!
//! Categories flagged for pluralization publish a second `_plural` table
//! whose spoken forms run through [`pluralize`]. The rule table follows the
//! usual inflection ordering: uncountables, then irregulars, then suffix
//! rules with the first match winning.

use regex::Regex;
use std::sync::LazyLock;

/// Words with no distinct plural form.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "money",
    "rice",
    "series",
    "sheep",
    "species",
];

/// Irregular singular/plural pairs, matched against the final word.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Suffix rules, applied in order; the first match wins.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)(quiz)$", "${1}zes"),
        (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(?i)(x|ch|ss|sh)$", "${1}es"),
        (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
        (r"(?i)([lr])f$", "${1}ves"),
        (r"(?i)([^f])fe$", "${1}ves"),
        (r"(?i)sis$", "ses"),
        (r"(?i)([ti])um$", "${1}a"),
        (r"(?i)(buffal|tomat|potat)o$", "${1}oes"),
        (r"(?i)(bu)s$", "${1}ses"),
        (r"(?i)(alias|status)$", "${1}es"),
        (r"(?i)(octop|vir)us$", "${1}i"),
        (r"(?i)(ax|test)is$", "${1}es"),
        (r"(?i)s$", "s"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("pluralization rule must compile"),
            replacement,
        )
    })
    .collect()
});

/// Pluralize a spoken form.
///
/// Multi-word forms pluralize their final word, which is where the rules
/// anchor anyway ("call site" becomes "call sites").
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let last = word.rsplit(' ').next().unwrap_or(word).to_lowercase();
    if UNCOUNTABLE.contains(&last.as_str()) {
        return word.to_string();
    }

    for (singular, plural) in IRREGULAR {
        if last == *singular {
            let stem = &word[..word.len() - singular.len()];
            return format!("{stem}{plural}");
        }
    }

    for (rule, replacement) in RULES.iter() {
        if rule.is_match(word) {
            return rule.replace(word, *replacement).into_owned();
        }
    }

    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(pluralize("cat"), "cats");
        assert_eq!(pluralize("line"), "lines");
        assert_eq!(pluralize("funk"), "funks");
        assert_eq!(pluralize("arg"), "args");
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
        assert_eq!(pluralize("glass"), "glasses");
        assert_eq!(pluralize("city"), "cities");
        assert_eq!(pluralize("shelf"), "shelves");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("quiz"), "quizzes");
        assert_eq!(pluralize("index"), "indices");
        assert_eq!(pluralize("thesis"), "theses");
        assert_eq!(pluralize("status"), "statuses");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(pluralize("man"), "men");
        assert_eq!(pluralize("woman"), "women");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("person"), "people");
    }

    #[test]
    fn test_uncountables_unchanged() {
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("series"), "series");
    }

    #[test]
    fn test_words_already_ending_in_s_unchanged() {
        assert_eq!(pluralize("lens"), "lens");
    }

    #[test]
    fn test_multi_word_forms_pluralize_last_word() {
        assert_eq!(pluralize("call site"), "call sites");
        assert_eq!(pluralize("if state"), "if states");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(pluralize(""), "");
    }
}
