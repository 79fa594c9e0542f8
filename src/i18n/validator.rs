//! Translation quality validation module.
//!
//! Machine translation of UI strings must not touch the parts the client
//! runtime interprets: `{{name}}` interpolation placeholders, `$t(key)`
//! nesting references and numbered component tags such as `<1>` / `</1>`.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the translation unusable
    pub errors: Vec<String>,

    /// Suspicious but usable results
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for machine-translated UI strings.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static NESTING_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Check that `translated` keeps every runtime token found in `original`.
    ///
    /// Missing or invented placeholders, nesting references and tags are
    /// errors. An empty translation of a non-empty string is an error; an
    /// unchanged string is only a warning since brand names and short labels
    /// often translate to themselves.
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        if translated.trim().is_empty() && !original.trim().is_empty() {
            report
                .errors
                .push("Translation is empty for a non-empty source".to_string());
            return report;
        }

        let orig_placeholders = Self::extract_placeholders(original);
        let trans_placeholders = Self::extract_placeholders(translated);
        if orig_placeholders != trans_placeholders {
            report.errors.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                orig_placeholders.keys().collect::<Vec<_>>(),
                trans_placeholders.keys().collect::<Vec<_>>()
            ));
        }

        let orig_nesting = Self::extract_nesting(original);
        let trans_nesting = Self::extract_nesting(translated);
        if orig_nesting != trans_nesting {
            report.errors.push(format!(
                "Nesting mismatch: original has {:?}, translation has {:?}",
                orig_nesting.keys().collect::<Vec<_>>(),
                trans_nesting.keys().collect::<Vec<_>>()
            ));
        }

        let orig_tags = Self::extract_tags(original);
        let trans_tags = Self::extract_tags(translated);
        if orig_tags != trans_tags {
            report.errors.push(format!(
                "Tag mismatch: original has {} tags, translation has {} tags",
                orig_tags.values().sum::<usize>(),
                trans_tags.values().sum::<usize>()
            ));
        }

        if original == translated && Self::has_translatable_text(original) {
            report
                .warnings
                .push("Translation is identical to the source".to_string());
        }

        report
    }

    fn has_translatable_text(text: &str) -> bool {
        placeholder_regex()
            .replace_all(text, "")
            .chars()
            .any(char::is_alphabetic)
    }

    /// `{{ count }}` and `{{count}}` are the same placeholder.
    fn extract_placeholders(text: &str) -> BTreeMap<String, usize> {
        count(
            placeholder_regex()
                .captures_iter(text)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str()),
        )
    }

    fn extract_nesting(text: &str) -> BTreeMap<String, usize> {
        let regex = NESTING_REGEX.get_or_init(|| Regex::new(r"\$t\(([^)]+)\)").unwrap());

        count(regex.captures_iter(text).filter_map(|cap| cap.get(1)).map(|m| m.as_str()))
    }

    fn extract_tags(text: &str) -> BTreeMap<String, usize> {
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"</?\d+\s*/?>").unwrap());

        count(regex.find_iter(text).map(|m| m.as_str()))
    }
}

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap())
}

fn count<'a>(items: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        let normalized: String = item.chars().filter(|c| !c.is_whitespace()).collect();
        *counts.entry(normalized).or_insert(0) += 1;
    }
    counts
}
