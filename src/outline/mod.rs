//! Outline extraction heuristic.
//!
//! The pipeline runs over the text spans of one document:
//!
//! 1. [`FontProfiler`] builds the size histogram and heading thresholds
//! 2. [`merge_lines`] joins font runs that share a visual line
//! 3. [`SpanFilter`] discards page numbers, fragments and boilerplate
//! 4. [`TitleDetector`] picks the title from the first page
//! 5. [`HeadingClassifier`] assigns levels to the remaining spans
//! 6. [`StructureGenerator`] assembles the [`Outline`]
//!
//! Every stage is a pure function of its input, so the same spans always
//! produce the same outline.

mod classify;
mod config;
mod filter;
mod merge;
mod profile;
mod structure;
mod text;
mod title;

pub use classify::{AllCapsRule, FontSizeRule, HeadingClassifier, NumberingRule, Rule};
pub use config::OutlineConfig;
pub use filter::{RejectReason, RepetitionIndex, SpanFilter};
pub use merge::merge_lines;
pub use profile::{key_size, size_key, FontProfile, FontProfiler, SizeKey, ThresholdSource};
pub use structure::StructureGenerator;
pub use text::{
    clean_text, collapse_whitespace, comparison_key, is_all_caps, is_spaceless_script_char,
    word_count,
};
pub use title::{TitleDetector, TitleMatch, TITLE_PAGE};

use serde::Serialize;

use crate::error::Result;
use crate::model::{HeadingCandidate, HeadingLevel, Outline, TextSpan};

/// What the pipeline decided for one merged span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanDecision {
    /// Part of the document title
    Title,
    /// Classified as a heading
    Heading(HeadingLevel),
    /// No rule matched
    Body,
    /// Discarded before classification
    Rejected(RejectReason),
}

/// Full trace of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Merged spans in reading order
    pub spans: Vec<TextSpan>,
    /// Font statistics of the raw spans
    pub profile: FontProfile,
    /// Decision per merged span, parallel to `spans`
    pub decisions: Vec<SpanDecision>,
    /// Resulting outline
    pub outline: Outline,
}

/// The complete outline heuristic.
#[derive(Debug)]
pub struct OutlinePipeline {
    config: OutlineConfig,
    profiler: FontProfiler,
    filter: SpanFilter,
    title: TitleDetector,
    classifier: HeadingClassifier,
    structure: StructureGenerator,
}

impl OutlinePipeline {
    /// Create a pipeline, validating the configuration.
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: OutlineConfig) -> Self {
        Self {
            profiler: FontProfiler::new(&config),
            filter: SpanFilter::new(&config),
            title: TitleDetector::new(),
            classifier: HeadingClassifier::new(&config),
            structure: StructureGenerator::new(config.dedupe_headings),
            config,
        }
    }

    /// Replace the heading rule chain.
    pub fn with_classifier(mut self, classifier: HeadingClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Extract the outline from a document's spans.
    pub fn run(&self, spans: &[TextSpan]) -> Outline {
        self.analyze(spans).outline
    }

    /// Run the pipeline and keep every intermediate decision.
    ///
    /// Spans with non-finite coordinates or size are ignored.
    pub fn analyze(&self, spans: &[TextSpan]) -> Analysis {
        let finite: Vec<TextSpan>;
        let spans = if spans.iter().all(TextSpan::has_finite_geometry) {
            spans
        } else {
            finite = spans
                .iter()
                .filter(|s| s.has_finite_geometry())
                .cloned()
                .collect();
            log::debug!(
                "Ignoring {} span(s) with non-finite geometry",
                spans.len() - finite.len()
            );
            &finite
        };

        let profile = self.profiler.profile(spans);
        let merged = merge_lines(spans, self.config.merge_gap_factor);
        log::debug!("Merged {} spans into {} lines", spans.len(), merged.len());

        let repetition = self.filter.repetition(&merged);
        let rejections = self.filter.apply(&merged, &repetition);
        let title = self
            .title
            .detect(&merged, &rejections, &repetition, &profile);

        let mut decisions = Vec::with_capacity(merged.len());
        let mut headings = Vec::new();
        for (i, span) in merged.iter().enumerate() {
            let decision = if title
                .as_ref()
                .is_some_and(|t| t.span_indices.contains(&i))
            {
                SpanDecision::Title
            } else if let Some(reason) = rejections[i] {
                log::trace!("Rejected {:?} on page {}: {}", span.text, span.page, reason);
                SpanDecision::Rejected(reason)
            } else {
                match self.classifier.classify_with_rule(span, &profile) {
                    Some((level, rule)) => {
                        log::trace!("{} {:?} on page {} via {}", level, span.text, span.page, rule);
                        headings.push(HeadingCandidate::new(level, span.text.clone(), span.page));
                        SpanDecision::Heading(level)
                    }
                    None => SpanDecision::Body,
                }
            };
            decisions.push(decision);
        }

        let outline = self
            .structure
            .build(title.map(|t| t.text), headings);
        log::debug!(
            "Outline: title={:?}, {} heading(s)",
            outline.title_str(),
            outline.headings.len()
        );

        Analysis {
            spans: merged,
            profile,
            decisions,
            outline,
        }
    }
}

impl Default for OutlinePipeline {
    fn default() -> Self {
        Self::from_valid(OutlineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(page: u32, y: f32) -> TextSpan {
        TextSpan::new("Ordinary paragraph text that fills the page.", 11.0, page, 72.0, y)
    }

    #[test]
    fn test_empty_input() {
        let outline = OutlinePipeline::default().run(&[]);
        assert_eq!(outline, Outline::empty());
    }

    #[test]
    fn test_title_not_repeated_as_heading() {
        let spans = vec![
            TextSpan::new("Field Manual", 26.0, 1, 72.0, 740.0),
            body(1, 700.0),
            TextSpan::new("1. Getting Started", 18.0, 2, 72.0, 740.0),
            body(2, 700.0),
            body(2, 680.0),
        ];
        let analysis = OutlinePipeline::default().analyze(&spans);
        assert_eq!(analysis.outline.title.as_deref(), Some("Field Manual"));
        assert_eq!(analysis.decisions[0], SpanDecision::Title);
        assert_eq!(
            analysis.outline.headings,
            vec![HeadingCandidate::new(HeadingLevel::H1, "1. Getting Started", 2)]
        );
    }

    #[test]
    fn test_split_runs_become_one_heading() {
        let prefix = TextSpan::new("Chapter ", 18.0, 2, 72.0, 700.0).with_bold(true);
        let suffix = TextSpan::new("Two", 18.0, 2, prefix.right(), 700.0);
        let spans = vec![body(1, 700.0), body(1, 680.0), prefix, suffix, body(2, 650.0)];

        let outline = OutlinePipeline::default().run(&spans);
        assert_eq!(outline.headings.len(), 1);
        assert_eq!(outline.headings[0].text, "Chapter Two");
        assert_eq!(outline.headings[0].page, 2);
    }

    #[test]
    fn test_rejections_recorded() {
        let spans = vec![
            body(1, 700.0),
            TextSpan::new("7", 11.0, 1, 300.0, 40.0),
            TextSpan::new("OVERVIEW", 11.0, 1, 72.0, 600.0),
        ];
        let analysis = OutlinePipeline::default().analyze(&spans);
        assert!(analysis
            .decisions
            .contains(&SpanDecision::Rejected(RejectReason::PageNumber)));
        assert!(analysis
            .decisions
            .contains(&SpanDecision::Heading(HeadingLevel::H1)));
        assert_eq!(analysis.decisions.len(), analysis.spans.len());
    }

    #[test]
    fn test_deterministic() {
        let spans = vec![
            TextSpan::new("Guide", 24.0, 1, 72.0, 740.0),
            body(1, 700.0),
            TextSpan::new("2.1 Scope", 12.0, 1, 72.0, 650.0),
            body(1, 620.0),
        ];
        let pipeline = OutlinePipeline::default();
        assert_eq!(pipeline.run(&spans), pipeline.run(&spans));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = OutlineConfig::default().with_min_level_gap(0.0);
        assert!(OutlinePipeline::new(config).is_err());
    }
}
