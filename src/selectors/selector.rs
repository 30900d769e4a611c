//! Single selector rule
//!
//! A selector pairs a polarity (include or exclude) with optional class and
//! method patterns. Patterns are regular expressions searched anywhere in the
//! name, so a plain class name also matches as a substring.

use super::{SelectorError, TestIdentity};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const EXCLUDE_PREFIX: char = '!';
const SEPARATOR: char = '#';
const MATCH_ANY: &str = "<any>";

/// One parsed selector rule
///
/// Construct with [`Selector::parse`]. Immutable afterwards; `Regex` is
/// `Send + Sync`, so a selector can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Selector {
    raw: String,
    inclusive: bool,
    /// `None` matches any class
    class_pattern: Option<Regex>,
    /// `None` matches any method
    method_pattern: Option<Regex>,
}

impl Selector {
    /// Parse a rule of the form `["!"] [class-part] ["#" [method-part]]`
    ///
    /// A leading `!` makes the selector exclusive. Without a `#` the whole
    /// remainder is the class-part. Empty class and method parts both mean
    /// "match any", so `#` includes everything and `!#` excludes everything.
    ///
    /// # Errors
    /// - `SelectorError::EmptyRule` if `raw` is empty
    /// - `SelectorError::MultipleSeparators` if `raw` contains more than one `#`
    /// - `SelectorError::InvalidPattern` if a part is not a valid regex
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        if raw.is_empty() {
            return Err(SelectorError::EmptyRule);
        }

        if raw.matches(SEPARATOR).count() > 1 {
            return Err(SelectorError::MultipleSeparators {
                rule: raw.to_string(),
            });
        }

        let (inclusive, remainder) = match raw.strip_prefix(EXCLUDE_PREFIX) {
            Some(rest) => (false, rest),
            None => (true, raw),
        };

        let (class_part, method_part) = match remainder.split_once(SEPARATOR) {
            Some((class_part, method_part)) => (class_part, method_part),
            None => (remainder, ""),
        };

        let class_pattern = compile_part(raw, class_part)?;
        let method_pattern = compile_part(raw, method_part)?;

        tracing::debug!(
            rule = raw,
            inclusive,
            class_pattern = ?class_pattern.as_ref().map(Regex::as_str),
            method_pattern = ?method_pattern.as_ref().map(Regex::as_str),
            "Parsed test selector"
        );

        Ok(Self {
            raw: raw.to_string(),
            inclusive,
            class_pattern,
            method_pattern,
        })
    }

    /// The rule string this selector was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True if a match means "run this test", false if it means "skip it"
    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    pub fn is_match_any_class(&self) -> bool {
        self.class_pattern.is_none()
    }

    pub fn is_match_any_method(&self) -> bool {
        self.method_pattern.is_none()
    }

    /// Whether the class pattern is found anywhere in `class_name`
    pub fn matches_class(&self, class_name: &str) -> bool {
        self.class_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(class_name))
    }

    /// Whether the method pattern is found anywhere in `method_name`
    pub fn matches_method(&self, method_name: &str) -> bool {
        self.method_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(method_name))
    }

    /// Whether both the class and the method of `identity` match
    pub fn matches(&self, identity: &TestIdentity) -> bool {
        self.matches_class(identity.class_name()) && self.matches_method(identity.method_name())
    }

    /// Human-readable description, e.g. `exclude class:com\.slow\..* method:<any>`
    pub fn explain(&self) -> String {
        format!(
            "{} class:{} method:{}",
            if self.inclusive { "include" } else { "exclude" },
            self.class_pattern
                .as_ref()
                .map_or(MATCH_ANY, Regex::as_str),
            self.method_pattern
                .as_ref()
                .map_or(MATCH_ANY, Regex::as_str),
        )
    }
}

/// Empty parts compile to "match any" rather than to an empty regex
fn compile_part(raw: &str, part: &str) -> Result<Option<Regex>, SelectorError> {
    if part.is_empty() {
        return Ok(None);
    }
    Regex::new(part)
        .map(Some)
        .map_err(|source| SelectorError::InvalidPattern {
            rule: raw.to_string(),
            source,
        })
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(class_name: &str, method_name: &str) -> TestIdentity {
        TestIdentity::new(class_name, method_name).expect("valid identity")
    }

    #[test]
    fn test_hash_alone_includes_everything() {
        let selector = Selector::parse("#").unwrap();
        assert!(selector.is_inclusive());
        assert!(selector.is_match_any_class());
        assert!(selector.is_match_any_method());
        assert!(selector.matches(&id("com.example.Test", "testX")));
    }

    #[test]
    fn test_bang_hash_excludes_everything() {
        let selector = Selector::parse("!#").unwrap();
        assert!(!selector.is_inclusive());
        assert!(selector.is_match_any_class());
        assert!(selector.is_match_any_method());
        assert!(selector.matches(&id("com.example.Test", "testX")));
    }

    #[test]
    fn test_bare_bang_matches_everything_exclusively() {
        let selector = Selector::parse("!").unwrap();
        assert!(!selector.is_inclusive());
        assert!(selector.is_match_any_class());
        assert!(selector.is_match_any_method());
    }

    #[test]
    fn test_class_only_rule() {
        let selector = Selector::parse("com.example.Test").unwrap();
        assert!(selector.is_inclusive());
        assert!(!selector.is_match_any_class());
        assert!(selector.is_match_any_method());
        assert!(selector.matches(&id("com.example.Test", "anything")));
        assert!(!selector.matches(&id("com.other.Thing", "anything")));
    }

    #[test]
    fn test_class_and_method_rule() {
        let selector = Selector::parse("com.example.Test#testX").unwrap();
        assert!(selector.matches(&id("com.example.Test", "testX")));
        assert!(!selector.matches(&id("com.example.Test", "testY")));
        assert!(!selector.matches(&id("com.other.Test", "testX")));
    }

    #[test]
    fn test_method_only_rule() {
        let selector = Selector::parse("#testX").unwrap();
        assert!(selector.is_match_any_class());
        assert!(!selector.is_match_any_method());
        assert!(selector.matches(&id("any.Class", "testX")));
        assert!(!selector.matches(&id("any.Class", "testY")));
    }

    #[test]
    fn test_trailing_hash_means_any_method() {
        let selector = Selector::parse("!com.example.Test#").unwrap();
        assert!(!selector.is_inclusive());
        assert!(!selector.is_match_any_class());
        assert!(selector.is_match_any_method());
    }

    #[test]
    fn test_multiple_separators_rejected() {
        for raw in ["a#b#c", "##", "!#a#", "a##"] {
            let err = Selector::parse(raw).unwrap_err();
            assert!(
                matches!(err, SelectorError::MultipleSeparators { ref rule } if rule == raw),
                "expected MultipleSeparators for {:?}, got {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_empty_rule_is_invalid_argument() {
        let err = Selector::parse("").unwrap_err();
        assert!(matches!(err, SelectorError::EmptyRule));
        assert!(!err.is_syntax_error());
    }

    #[test]
    fn test_invalid_regex_wraps_diagnostic() {
        let err = Selector::parse("com.example.(Test#testX").unwrap_err();
        assert!(err.is_syntax_error());
        assert_eq!(err.rule(), Some("com.example.(Test#testX"));
        let message = err.to_string();
        assert!(message.contains("com.example.(Test#testX"), "got: {}", message);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_method_regex_rejected() {
        let err = Selector::parse("#test[").unwrap_err();
        assert!(matches!(err, SelectorError::InvalidPattern { .. }));
    }

    #[test]
    fn test_patterns_are_searched_not_anchored() {
        let selector = Selector::parse("example#X").unwrap();
        assert!(selector.matches(&id("com.example.Test", "testX")));
    }

    #[test]
    fn test_patterns_are_regular_expressions() {
        let selector = Selector::parse(r"com\.slow\..*#^test\d+$").unwrap();
        assert!(selector.matches(&id("com.slow.FooTest", "test42")));
        assert!(!selector.matches(&id("com.slow.FooTest", "test42b")));
        assert!(!selector.matches(&id("comXslow.FooTest", "test42")));
    }

    #[test]
    fn test_explain_renders_any_for_missing_patterns() {
        assert_eq!(
            Selector::parse("#").unwrap().explain(),
            "include class:<any> method:<any>"
        );
        assert_eq!(
            Selector::parse("!com.example.Test#").unwrap().explain(),
            "exclude class:com.example.Test method:<any>"
        );
        assert_eq!(
            Selector::parse("#testX").unwrap().to_string(),
            "include class:<any> method:testX"
        );
    }

    #[test]
    fn test_raw_rule_is_kept() {
        let selector: Selector = "!com.example.Test#testX".parse().unwrap();
        assert_eq!(selector.raw(), "!com.example.Test#testX");
    }

    #[test]
    fn test_bang_only_counts_as_prefix() {
        // A '!' after the first character is part of the pattern
        let selector = Selector::parse("a!b").unwrap();
        assert!(selector.is_inclusive());
        assert!(selector.matches(&id("xa!by", "m")));
    }
}
