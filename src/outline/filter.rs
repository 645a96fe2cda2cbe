//! Pre-classification span filters.
//!
//! Page numbers, stray glyphs, paragraph-length runs and running
//! headers/footers are discarded before any heading rule looks at them.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::Serialize;

use crate::model::TextSpan;

use super::config::OutlineConfig;
use super::text::comparison_key;

/// Why a span was discarded before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// Bare page number ("12", "- 12 -", "Page 3 of 9")
    PageNumber,
    /// Fewer visible characters than the configured minimum
    TooShort,
    /// More characters than a heading plausibly has
    TooLong,
    /// Same text at the same position on the preceding page
    Boilerplate,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RejectReason::PageNumber => "page number",
            RejectReason::TooShort => "too short",
            RejectReason::TooLong => "too long",
            RejectReason::Boilerplate => "boilerplate",
        };
        f.write_str(label)
    }
}

/// Per-span repetition flags across neighbouring pages.
#[derive(Debug, Clone, Default)]
pub struct RepetitionIndex {
    /// Text also appears at the same position on the preceding page
    pub repeats_previous: Vec<bool>,
    /// Text also appears at the same position on the following page
    pub repeats_next: Vec<bool>,
}

impl RepetitionIndex {
    /// Whether the span at `index` looks like a running header or footer.
    pub fn is_running(&self, index: usize) -> bool {
        self.repeats_previous.get(index).copied().unwrap_or(false)
            || self.repeats_next.get(index).copied().unwrap_or(false)
    }
}

/// Span filter built from the heuristic configuration.
#[derive(Debug, Clone)]
pub struct SpanFilter {
    page_number_regex: Regex,
    min_chars: usize,
    max_chars: usize,
    y_tolerance: f32,
}

impl SpanFilter {
    /// Create a filter from the heuristic configuration.
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            page_number_regex: Regex::new(
                r"^(?i:page\s+)?[-–—]?\s*\d+\s*[-–—]?(?i:\s+of\s+\d+)?$",
            )
            .expect("page number pattern is valid"),
            min_chars: config.min_chars,
            max_chars: config.max_chars,
            y_tolerance: config.boilerplate_y_tolerance,
        }
    }

    /// Whether the text is only a page number.
    pub fn is_page_number(&self, text: &str) -> bool {
        self.page_number_regex.is_match(text.trim())
    }

    /// Checks that depend on the span alone.
    pub fn check_text(&self, span: &TextSpan) -> Option<RejectReason> {
        if self.is_page_number(&span.text) {
            return Some(RejectReason::PageNumber);
        }
        let visible = span.visible_len();
        if visible < self.min_chars {
            return Some(RejectReason::TooShort);
        }
        if span.text.trim().chars().count() > self.max_chars {
            return Some(RejectReason::TooLong);
        }
        None
    }

    /// Decide, for every span, whether it is discarded and why.
    ///
    /// `spans` must be in reading order. Boilerplate only applies from the
    /// second page on; the first appearance is left to classification.
    pub fn apply(&self, spans: &[TextSpan], repetition: &RepetitionIndex) -> Vec<Option<RejectReason>> {
        spans
            .iter()
            .enumerate()
            .map(|(i, span)| {
                self.check_text(span).or_else(|| {
                    repetition
                        .repeats_previous
                        .get(i)
                        .copied()
                        .unwrap_or(false)
                        .then_some(RejectReason::Boilerplate)
                })
            })
            .collect()
    }

    /// Find spans whose text repeats at the same position on adjacent pages.
    pub fn repetition(&self, spans: &[TextSpan]) -> RepetitionIndex {
        let pages: Vec<u32> = spans
            .iter()
            .map(|s| s.page)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // page -> text key -> baselines
        let mut by_page: HashMap<u32, HashMap<String, Vec<f32>>> = HashMap::new();
        for span in spans {
            by_page
                .entry(span.page)
                .or_default()
                .entry(comparison_key(&span.text))
                .or_default()
                .push(span.y);
        }

        let neighbour = |page: u32, offset: isize| -> Option<u32> {
            let pos = pages.binary_search(&page).ok()?;
            let target = pos.checked_add_signed(offset)?;
            pages.get(target).copied()
        };

        let matches_on = |page: Option<u32>, key: &str, y: f32| -> bool {
            page.and_then(|p| by_page.get(&p))
                .and_then(|texts| texts.get(key))
                .is_some_and(|ys| ys.iter().any(|other| (other - y).abs() <= self.y_tolerance))
        };

        let mut index = RepetitionIndex {
            repeats_previous: Vec::with_capacity(spans.len()),
            repeats_next: Vec::with_capacity(spans.len()),
        };
        for span in spans {
            let key = comparison_key(&span.text);
            index
                .repeats_previous
                .push(matches_on(neighbour(span.page, -1), &key, span.y));
            index
                .repeats_next
                .push(matches_on(neighbour(span.page, 1), &key, span.y));
        }
        index
    }
}
