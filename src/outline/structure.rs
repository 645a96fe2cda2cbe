//! Final outline assembly.

use std::collections::HashSet;

use crate::model::{HeadingCandidate, Outline};

use super::text::{clean_text, comparison_key};

/// Turns a title and classified headings into an [`Outline`].
#[derive(Debug, Clone, Default)]
pub struct StructureGenerator {
    dedupe: bool,
}

impl StructureGenerator {
    pub fn new(dedupe: bool) -> Self {
        Self { dedupe }
    }

    /// Assemble the outline.
    ///
    /// Headings keep their reading order. Text is cleaned and headings whose
    /// text cleans to nothing are dropped. With deduplication on, only the
    /// first heading of each level and text is kept.
    pub fn build(&self, title: Option<String>, headings: Vec<HeadingCandidate>) -> Outline {
        let title = title
            .map(|t| clean_text(&t))
            .filter(|t| !t.is_empty());

        let mut seen = HashSet::new();
        let headings: Vec<HeadingCandidate> = headings
            .into_iter()
            .filter_map(|mut heading| {
                heading.text = clean_text(&heading.text);
                if heading.text.is_empty() {
                    return None;
                }
                if self.dedupe && !seen.insert((heading.level, comparison_key(&heading.text))) {
                    log::trace!("Dropping repeated heading {:?}", heading.text);
                    return None;
                }
                Some(heading)
            })
            .collect();

        Outline::new(title, headings)
    }
}
