//! First-page title detection.

use crate::model::TextSpan;

use super::filter::{RejectReason, RepetitionIndex};
use super::profile::{size_key, FontProfile};
use super::text::clean_text;

/// Page the title is taken from.
pub const TITLE_PAGE: u32 = 1;

/// A detected title and the spans it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    /// Cleaned title text
    pub text: String,
    /// Indices (into the span slice given to the detector) of consumed spans
    pub span_indices: Vec<usize>,
}

/// Picks the document title from the most prominent first-page text.
#[derive(Debug, Clone, Default)]
pub struct TitleDetector;

impl TitleDetector {
    /// Create a title detector.
    pub fn new() -> Self {
        Self
    }

    /// Detect the title among `spans` (reading order, merged).
    ///
    /// `rejections` and `repetition` are the filter results for the same
    /// slice. Only spans on [`TITLE_PAGE`] are considered. Returns `None`
    /// when no first-page span is larger than body text and at least as
    /// large as the H1 threshold.
    pub fn detect(
        &self,
        spans: &[TextSpan],
        rejections: &[Option<RejectReason>],
        repetition: &RepetitionIndex,
        profile: &FontProfile,
    ) -> Option<TitleMatch> {
        let h1_key = size_key(profile.h1_threshold);
        let is_candidate = |i: usize| -> bool {
            let span = &spans[i];
            span.page == TITLE_PAGE
                && rejections.get(i).copied().flatten().is_none()
                && !repetition.is_running(i)
                && profile.exceeds_body(span.font_size)
                && size_key(span.font_size) >= h1_key
        };

        let candidates: Vec<usize> = (0..spans.len()).filter(|&i| is_candidate(i)).collect();
        let largest = candidates
            .iter()
            .map(|&i| size_key(spans[i].font_size))
            .max()?;

        // Topmost span at the largest size, extended over the contiguous run.
        let start = candidates
            .iter()
            .copied()
            .find(|&i| size_key(spans[i].font_size) == largest)?;
        let mut span_indices = vec![start];
        let mut next = start + 1;
        while next < spans.len() && is_candidate(next) && size_key(spans[next].font_size) == largest
        {
            span_indices.push(next);
            next += 1;
        }

        let joined = span_indices
            .iter()
            .map(|&i| spans[i].text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let text = clean_text(&joined);
        if text.is_empty() {
            return None;
        }

        log::debug!("Title detected: {:?} ({} span(s))", text, span_indices.len());
        Some(TitleMatch { text, span_indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::config::OutlineConfig;
    use crate::outline::filter::SpanFilter;
    use crate::outline::profile::FontProfiler;

    fn detect(spans: &[TextSpan]) -> Option<TitleMatch> {
        let config = OutlineConfig::default();
        let filter = SpanFilter::new(&config);
        let repetition = filter.repetition(spans);
        let rejections = filter.apply(spans, &repetition);
        let profile = FontProfiler::new(&config).profile(spans);
        TitleDetector::new().detect(spans, &rejections, &repetition, &profile)
    }

    fn body(page: u32, y: f32) -> TextSpan {
        TextSpan::new("Regular paragraph text for the body.", 11.0, page, 72.0, y)
    }

    #[test]
    fn test_largest_first_page_span() {
        let spans = vec![
            TextSpan::new("Project Report", 24.0, 1, 72.0, 720.0),
            body(1, 650.0),
            body(1, 630.0),
        ];
        let title = detect(&spans).unwrap();
        assert_eq!(title.text, "Project Report");
        assert_eq!(title.span_indices, vec![0]);
    }

    #[test]
    fn test_multi_line_title_joined() {
        let spans = vec![
            TextSpan::new("Annual Review of", 22.0, 1, 72.0, 720.0),
            TextSpan::new("Distributed  Systems.", 22.0, 1, 72.0, 695.0),
            body(1, 650.0),
            body(1, 630.0),
            body(1, 610.0),
        ];
        let title = detect(&spans).unwrap();
        assert_eq!(title.text, "Annual Review of Distributed Systems");
        assert_eq!(title.span_indices, vec![0, 1]);
    }

    #[test]
    fn test_title_only_from_first_page() {
        let spans = vec![
            body(1, 700.0),
            body(1, 680.0),
            TextSpan::new("Late Heading", 24.0, 2, 72.0, 720.0),
            body(2, 650.0),
        ];
        assert_eq!(detect(&spans), None);
    }

    #[test]
    fn test_single_size_document_has_no_title() {
        let spans = vec![body(1, 700.0), body(1, 680.0)];
        assert_eq!(detect(&spans), None);
    }

    #[test]
    fn test_running_header_never_title() {
        let spans = vec![
            TextSpan::new("Quarterly Bulletin", 26.0, 1, 72.0, 770.0),
            TextSpan::new("Market Outlook", 20.0, 1, 72.0, 700.0),
            body(1, 650.0),
            body(1, 630.0),
            TextSpan::new("1", 11.0, 1, 300.0, 40.0),
            TextSpan::new("Quarterly Bulletin", 26.0, 2, 72.0, 770.0),
            body(2, 650.0),
            body(2, 630.0),
        ];
        // The header repeats on page 2; the 20pt line is below the 26pt H1
        // threshold.
        assert_eq!(detect(&spans), None);
    }

    #[test]
    fn test_tie_broken_by_topmost() {
        let spans = vec![
            TextSpan::new("Upper Banner", 24.0, 1, 72.0, 740.0),
            body(1, 700.0),
            TextSpan::new("Lower Banner", 24.0, 1, 72.0, 500.0),
            body(1, 480.0),
            body(1, 460.0),
        ];
        let title = detect(&spans).unwrap();
        assert_eq!(title.text, "Upper Banner");
        assert_eq!(title.span_indices, vec![0]);
    }
}
