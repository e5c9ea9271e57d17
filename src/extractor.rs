//! Login-code extraction from message text.
//!
//! This module provides a small [`Matcher`] trait, a regex implementation, and the
//! [`CodeExtractor`] that tries a fixed, ordered list of phrasings before falling back
//! to any 5-digit run.
//!
//! # Example
//!
//! ```
//! use tg_code_relay::extractor::CodeExtractor;
//!
//! let extractor = CodeExtractor::new();
//! assert_eq!(extractor.extract(Some("**Login code:** 35628")).as_deref(), Some("35628"));
//! assert_eq!(extractor.extract(Some("no digits here")), None);
//! assert_eq!(extractor.extract(None), None);
//! ```

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Trait for matching and extracting content from message text.
pub trait Matcher: Send + Sync {
    /// Attempts to find and extract matching content from the text.
    ///
    /// Returns `Some(matched_value)` if found, `None` otherwise.
    /// Uses `Cow<str>` to avoid allocations when the match can be borrowed
    /// directly from the input text.
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>>;

    /// Returns a human-readable description of what this matcher looks for.
    ///
    /// Used in logging.
    fn description(&self) -> &str;
}

/// Regex-based matcher that extracts the first capture group.
///
/// # Example
///
/// ```
/// use tg_code_relay::extractor::{Matcher, RegexMatcher};
///
/// let matcher = RegexMatcher::new(r"code:\s*(\d+)").unwrap();
/// assert_eq!(matcher.find_match("Your CODE: 42").as_deref(), Some("42"));
/// ```
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
    description: String,
}

impl RegexMatcher {
    /// Creates a new case-insensitive regex matcher.
    ///
    /// The first capture group is extracted as the match result.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_description(pattern, format!("regex pattern: {pattern}"))
    }

    /// Creates a new case-insensitive regex matcher with a custom description.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn with_description(
        pattern: &str,
        description: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            description: description.into(),
            regex,
        })
    }
}

impl Matcher for RegexMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Code phrasings in priority order. Reordering changes which digits win.
const LOGIN_CODE_PATTERNS: [(&str, &str); 7] = [
    (r"\*\*Login code:\*\*\s*(\d{5})", "bold login code label"),
    (r"Login code:\s*(\d{5})", "login code label"),
    (r"Your login code is (\d{5})", "login code sentence"),
    (r"(\d{5}) is your Telegram code", "telegram code sentence"),
    (r"code[：:]\s*(\d{5})", "generic code label"),
    (r"验证码[：:]\s*(\d{5})", "localized code label"),
    (r"(\d{5})", "any 5-digit run"),
];

static DEFAULT_MATCHERS: Lazy<Vec<RegexMatcher>> = Lazy::new(|| {
    LOGIN_CODE_PATTERNS
        .iter()
        .map(|(pattern, description)| {
            RegexMatcher::with_description(pattern, *description).expect("valid regex")
        })
        .collect()
});

/// Extracts 5-digit login codes from official notifications.
///
/// Specific phrasings are tried first; the bare digit scan only runs when none of
/// them matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeExtractor;

impl CodeExtractor {
    /// Creates an extractor over the built-in pattern list.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the first code found by the highest-priority matching pattern.
    #[must_use]
    pub fn extract(&self, text: Option<&str>) -> Option<String> {
        self.extract_with_pattern(text).map(|(code, _)| code)
    }

    /// Like [`extract`](Self::extract), also returning the description of the pattern that hit.
    #[must_use]
    pub fn extract_with_pattern(&self, text: Option<&str>) -> Option<(String, &'static str)> {
        let text = text.filter(|t| !t.is_empty())?;

        DEFAULT_MATCHERS.iter().find_map(|matcher| {
            matcher
                .find_match(text)
                .map(|code| (code.into_owned(), matcher.description()))
        })
    }

    /// The matchers in evaluation order.
    #[must_use]
    pub fn matchers(&self) -> &'static [RegexMatcher] {
        &DEFAULT_MATCHERS
    }
}
