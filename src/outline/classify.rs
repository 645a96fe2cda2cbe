//! Heading classification as an ordered rule chain.
//!
//! Rules are evaluated top to bottom and the first one that returns a level
//! wins. The default chain is:
//!
//! 1. [`NumberingRule`]: decimal section numbers ("2.1 Background")
//! 2. [`FontSizeRule`]: font size against the document thresholds
//! 3. [`AllCapsRule`]: short all-caps lines ("OVERVIEW")
//!
//! A span no rule claims is body text.

use regex::Regex;

use crate::model::{HeadingLevel, TextSpan};

use super::config::OutlineConfig;
use super::profile::FontProfile;
use super::text::{is_all_caps, word_count};

/// A single heading heuristic.
pub trait Rule: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Level this rule assigns to the span, if any.
    fn apply(&self, span: &TextSpan, profile: &FontProfile) -> Option<HeadingLevel>;
}

/// Decimal section numbering: `1.2.3` is H3, `1.2` is H2, `1.` is H1.
///
/// Independent of font size.
#[derive(Debug, Clone)]
pub struct NumberingRule {
    h3: Regex,
    h2: Regex,
    h1: Regex,
}

impl NumberingRule {
    pub fn new() -> Self {
        Self {
            h3: Regex::new(r"^\d+\.\d+\.\d+").expect("H3 numbering pattern is valid"),
            h2: Regex::new(r"^\d+\.\d+").expect("H2 numbering pattern is valid"),
            h1: Regex::new(r"^\d+\.").expect("H1 numbering pattern is valid"),
        }
    }
}

impl Default for NumberingRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NumberingRule {
    fn name(&self) -> &'static str {
        "numbering"
    }

    fn apply(&self, span: &TextSpan, _profile: &FontProfile) -> Option<HeadingLevel> {
        let text = span.text.trim();
        if self.h3.is_match(text) {
            Some(HeadingLevel::H3)
        } else if self.h2.is_match(text) {
            Some(HeadingLevel::H2)
        } else if self.h1.is_match(text) {
            Some(HeadingLevel::H1)
        } else {
            None
        }
    }
}

/// Font size at or above a level threshold.
///
/// Large text only counts when it reads like a heading: it must not start
/// with a lowercase letter and must have at most `max_words` words. This
/// keeps enlarged sentence fragments and pull quotes out of the outline.
#[derive(Debug, Clone, Copy)]
pub struct FontSizeRule {
    max_words: usize,
}

impl FontSizeRule {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    fn reads_like_heading(&self, text: &str) -> bool {
        let starts_lowercase = text
            .chars()
            .find(|c| c.is_alphanumeric())
            .is_some_and(char::is_lowercase);
        !starts_lowercase && word_count(text) <= self.max_words
    }
}

impl Default for FontSizeRule {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Rule for FontSizeRule {
    fn name(&self) -> &'static str {
        "font-size"
    }

    fn apply(&self, span: &TextSpan, profile: &FontProfile) -> Option<HeadingLevel> {
        let level = profile.level_for_size(span.font_size)?;
        self.reads_like_heading(span.text.trim()).then_some(level)
    }
}

/// Short line where every letter is uppercase.
#[derive(Debug, Clone, Copy)]
pub struct AllCapsRule {
    max_words: usize,
}

impl AllCapsRule {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }
}

impl Default for AllCapsRule {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Rule for AllCapsRule {
    fn name(&self) -> &'static str {
        "all-caps"
    }

    fn apply(&self, span: &TextSpan, _profile: &FontProfile) -> Option<HeadingLevel> {
        let text = span.text.trim();
        (is_all_caps(text) && word_count(text) <= self.max_words).then_some(HeadingLevel::H1)
    }
}

/// Ordered collection of heading rules.
pub struct HeadingClassifier {
    rules: Vec<Box<dyn Rule>>,
}

impl HeadingClassifier {
    /// Default rule chain configured from `config`.
    pub fn new(config: &OutlineConfig) -> Self {
        Self::with_rules(vec![
            Box::new(NumberingRule::new()),
            Box::new(FontSizeRule::new(config.max_heading_words)),
            Box::new(AllCapsRule::new(config.max_caps_words)),
        ])
    }

    /// Classifier with a custom rule order.
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Heading level of a span, or `None` for body text.
    pub fn classify(&self, span: &TextSpan, profile: &FontProfile) -> Option<HeadingLevel> {
        self.classify_with_rule(span, profile).map(|(level, _)| level)
    }

    /// Like [`classify`](Self::classify), also naming the rule that matched.
    pub fn classify_with_rule(
        &self,
        span: &TextSpan,
        profile: &FontProfile,
    ) -> Option<(HeadingLevel, &'static str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(span, profile).map(|level| (level, rule.name())))
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(&OutlineConfig::default())
    }
}

impl std::fmt::Debug for HeadingClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadingClassifier")
            .field("rules", &self.rule_names())
            .finish()
    }
}
