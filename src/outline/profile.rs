//! Document-wide font statistics and heading thresholds.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{HeadingLevel, TextSpan};

use super::config::OutlineConfig;

/// A font size rounded to tenths of a point.
pub type SizeKey = i32;

/// Round a font size to its histogram key.
pub fn size_key(size: f32) -> SizeKey {
    (size * 10.0).round() as SizeKey
}

/// Font size represented by a histogram key.
pub fn key_size(key: SizeKey) -> f32 {
    key as f32 / 10.0
}

/// Where a heading threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThresholdSource {
    /// A distinct font size observed in the document
    Detected,
    /// Body size plus margin, because the document has too few sizes
    Synthesized,
}

/// Immutable font statistics of one document.
///
/// Invariant: `h1_threshold >= h2_threshold >= h3_threshold >= body_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontProfile {
    /// Rounded font size -> weight (characters or spans)
    pub size_histogram: BTreeMap<SizeKey, usize>,
    pub h1_threshold: f32,
    pub h2_threshold: f32,
    pub h3_threshold: f32,
    /// Body text size (most frequent)
    pub body_threshold: f32,
    /// Origin of the H1, H2 and H3 thresholds
    pub sources: [ThresholdSource; 3],
}

impl FontProfile {
    /// Threshold for a heading level.
    pub fn threshold(&self, level: HeadingLevel) -> f32 {
        match level {
            HeadingLevel::H1 => self.h1_threshold,
            HeadingLevel::H2 => self.h2_threshold,
            HeadingLevel::H3 => self.h3_threshold,
        }
    }

    /// How the threshold for a heading level was obtained.
    pub fn source(&self, level: HeadingLevel) -> ThresholdSource {
        self.sources[(level.depth() - 1) as usize]
    }

    /// Number of levels backed by an observed font size.
    pub fn detected_levels(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| **s == ThresholdSource::Detected)
            .count()
    }

    /// Whether fewer than three heading sizes were found.
    pub fn is_degenerate(&self) -> bool {
        self.detected_levels() < 3
    }

    /// Heading level implied by a font size alone.
    pub fn level_for_size(&self, font_size: f32) -> Option<HeadingLevel> {
        let key = size_key(font_size);
        [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]
            .into_iter()
            .find(|level| key >= size_key(self.threshold(*level)))
    }

    /// Whether a font size is strictly larger than body text.
    pub fn exceeds_body(&self, font_size: f32) -> bool {
        size_key(font_size) > size_key(self.body_threshold)
    }
}

/// Builds a [`FontProfile`] from all spans of a document.
#[derive(Debug, Clone)]
pub struct FontProfiler {
    min_level_gap: SizeKey,
    heading_margin: SizeKey,
    default_body_size: f32,
    weight_by_chars: bool,
}

impl FontProfiler {
    /// Create a profiler from the heuristic configuration.
    pub fn new(config: &OutlineConfig) -> Self {
        Self {
            min_level_gap: size_key(config.min_level_gap).max(1),
            heading_margin: size_key(config.heading_margin).max(1),
            default_body_size: config.default_body_size,
            weight_by_chars: config.weight_by_chars,
        }
    }

    /// Compute the profile of a document.
    pub fn profile(&self, spans: &[TextSpan]) -> FontProfile {
        let histogram = self.histogram(spans);
        let body_key = body_key(&histogram).unwrap_or_else(|| size_key(self.default_body_size));

        // Distinct sizes clearly above body, largest first, thinned so that
        // adjacent levels are at least `min_level_gap` apart.
        let mut detected: Vec<SizeKey> = Vec::with_capacity(3);
        for &key in histogram.keys().rev() {
            if key < body_key + self.min_level_gap {
                break;
            }
            if detected.len() == 3 {
                break;
            }
            match detected.last() {
                Some(&prev) if prev - key < self.min_level_gap => continue,
                _ => detected.push(key),
            }
        }

        let floor = body_key + self.heading_margin;
        let mut thresholds = [floor; 3];
        let mut sources = [ThresholdSource::Synthesized; 3];
        for i in 0..3 {
            if let Some(&key) = detected.get(i) {
                thresholds[i] = key;
                sources[i] = ThresholdSource::Detected;
            } else if i > 0 {
                thresholds[i] = thresholds[i - 1].min(floor);
            }
        }

        let profile = FontProfile {
            size_histogram: histogram,
            h1_threshold: key_size(thresholds[0]),
            h2_threshold: key_size(thresholds[1]),
            h3_threshold: key_size(thresholds[2]),
            body_threshold: key_size(body_key),
            sources,
        };

        log::debug!(
            "Font profile: body={:.1} h1={:.1} h2={:.1} h3={:.1} detected_levels={}",
            profile.body_threshold,
            profile.h1_threshold,
            profile.h2_threshold,
            profile.h3_threshold,
            profile.detected_levels()
        );
        if profile.is_degenerate() {
            log::debug!("Degenerate font profile, relying on text patterns");
        }

        profile
    }

    fn histogram(&self, spans: &[TextSpan]) -> BTreeMap<SizeKey, usize> {
        let mut histogram = BTreeMap::new();
        for span in spans {
            let visible = span.visible_len();
            if visible == 0 || !span.font_size.is_finite() || span.font_size <= 0.0 {
                continue;
            }
            let weight = if self.weight_by_chars { visible } else { 1 };
            *histogram.entry(size_key(span.font_size)).or_insert(0) += weight;
        }
        histogram
    }
}

/// Most frequent size; ties go to the smaller size.
fn body_key(histogram: &BTreeMap<SizeKey, usize>) -> Option<SizeKey> {
    let mut best: Option<(SizeKey, usize)> = None;
    for (&key, &count) in histogram {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}
