//! Plain-text passes applied to page source before parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::frontmatter::Frontmatter;

static IMPORT_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"import\s+(.*?)\s+from\s+(['"])(.*?)(?:"|');?"#).unwrap());

/// Replace every `\r\n` with `\n`.
#[must_use]
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Remove ES module import statements (`import X from 'y'`).
#[must_use]
pub fn strip_import_statements(text: &str) -> String {
    IMPORT_STATEMENT.replace_all(text, "").into_owned()
}

/// A text substitution applied to page source and frontmatter strings.
#[derive(Clone, Debug)]
pub struct ReplaceRule {
    /// Pattern; every match is replaced.
    pub search: Regex,
    /// Replacement, may reference capture groups (`$1`).
    pub replace: String,
}

impl ReplaceRule {
    /// Compile a rule from a pattern string.
    ///
    /// # Errors
    ///
    /// Returns an error if `search` is not a valid regular expression.
    pub fn new(search: &str, replace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            search: Regex::new(search)?,
            replace: replace.into(),
        })
    }

    fn apply(&self, text: &str) -> String {
        self.search
            .replace_all(text, self.replace.as_str())
            .into_owned()
    }
}

impl PartialEq for ReplaceRule {
    fn eq(&self, other: &Self) -> bool {
        self.search.as_str() == other.search.as_str() && self.replace == other.replace
    }
}

/// Apply rules in order to a string.
#[must_use]
pub fn apply_replace_rules(text: &str, rules: &[ReplaceRule]) -> String {
    rules
        .iter()
        .fold(text.to_owned(), |acc, rule| rule.apply(&acc))
}

/// Apply rules to every string value in frontmatter, at any depth.
pub fn apply_replace_rules_to_frontmatter(frontmatter: &mut Frontmatter, rules: &[ReplaceRule]) {
    if rules.is_empty() {
        return;
    }
    for value in frontmatter.values_mut() {
        replace_in_value(value, rules);
    }
}

fn replace_in_value(value: &mut Value, rules: &[ReplaceRule]) {
    match value {
        Value::String(s) => *s = apply_replace_rules(s, rules),
        Value::Array(items) => {
            for item in items {
                replace_in_value(item, rules);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                replace_in_value(item, rules);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\r\n"), "a\nb\n");
        assert_eq!(normalize_line_endings("a\rb"), "a\rb");
    }

    #[test]
    fn test_normalize_line_endings_is_idempotent() {
        let once = normalize_line_endings("# T\r\n\r\nBody\r\n");
        assert_eq!(normalize_line_endings(&once), once);
    }

    #[test]
    fn test_strip_import_statements() {
        let source = "import Tabs from '@theme/Tabs';\nimport { A, B } from \"./ab\"\n\n# Title\n";
        assert_eq!(strip_import_statements(source), "\n\n\n# Title\n");
    }

    #[test]
    fn test_strip_import_statements_leaves_prose() {
        let source = "Imports are important.\n";
        assert_eq!(strip_import_statements(source), source);
    }

    #[test]
    fn test_replace_rules_apply_in_order() {
        let rules = vec![
            ReplaceRule::new("foo", "bar").unwrap(),
            ReplaceRule::new("bar", "baz").unwrap(),
        ];
        assert_eq!(apply_replace_rules("foo bar", &rules), "baz baz");
    }

    #[test]
    fn test_replace_rules_capture_groups() {
        let rules = vec![ReplaceRule::new(r"v(\d+)", "version $1").unwrap()];
        assert_eq!(apply_replace_rules("see v2", &rules), "see version 2");
    }

    #[test]
    fn test_invalid_rule_pattern() {
        assert!(ReplaceRule::new("(", "x").is_err());
    }

    #[test]
    fn test_replace_rules_in_frontmatter() {
        let rules = vec![ReplaceRule::new("PKG", "quire").unwrap()];
        let Value::Object(mut frontmatter) = json!({
            "title": "Using PKG",
            "order": 3,
            "tags": ["PKG", "docs"],
            "hero": { "name": "PKG", "actions": [{ "text": "Get PKG" }] }
        }) else {
            unreachable!()
        };

        apply_replace_rules_to_frontmatter(&mut frontmatter, &rules);

        assert_eq!(
            Value::Object(frontmatter),
            json!({
                "title": "Using quire",
                "order": 3,
                "tags": ["quire", "docs"],
                "hero": { "name": "quire", "actions": [{ "text": "Get quire" }] }
            })
        );
    }
}
