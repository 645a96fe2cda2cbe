//! Heuristic configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable constants of the outline heuristic.
///
/// Deserializes from partial JSON: unspecified fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Minimum size difference (points) between two heading levels
    pub min_level_gap: f32,

    /// Margin above body size used for synthesized thresholds
    pub heading_margin: f32,

    /// Body size assumed when a document has no text
    pub default_body_size: f32,

    /// Weight the size histogram by character count instead of span count
    pub weight_by_chars: bool,

    /// Spans with fewer visible characters are discarded
    pub min_chars: usize,

    /// Spans with more characters are discarded (paragraphs, not headings)
    pub max_chars: usize,

    /// Maximum word count for the all-caps heading rule
    pub max_caps_words: usize,

    /// Maximum word count for a heading found by font size alone
    pub max_heading_words: usize,

    /// Vertical tolerance (points) for matching repeated headers/footers
    pub boilerplate_y_tolerance: f32,

    /// Maximum horizontal gap, in multiples of font size, for same-line merging
    pub merge_gap_factor: f32,

    /// Drop headings whose text already appeared earlier in the outline
    pub dedupe_headings: bool,
}

impl OutlineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a (possibly partial) configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Parse a (possibly partial) configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints.
    pub fn validate(&self) -> Result<()> {
        // A zero gap or margin would let body-sized text satisfy a threshold.
        let positive = [
            ("min_level_gap", self.min_level_gap),
            ("heading_margin", self.heading_margin),
            ("default_body_size", self.default_body_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value < 0.1 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be at least 0.1, got {}",
                    name, value
                )));
            }
        }
        let non_negative = [
            ("boilerplate_y_tolerance", self.boilerplate_y_tolerance),
            ("merge_gap_factor", self.merge_gap_factor),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.min_chars == 0 {
            return Err(Error::InvalidConfig("min_chars must be at least 1".into()));
        }
        if self.max_heading_words == 0 {
            return Err(Error::InvalidConfig(
                "max_heading_words must be at least 1".into(),
            ));
        }
        if self.max_chars < self.min_chars {
            return Err(Error::InvalidConfig(format!(
                "max_chars ({}) must not be below min_chars ({})",
                self.max_chars, self.min_chars
            )));
        }
        Ok(())
    }

    /// Set the minimum gap between heading levels.
    pub fn with_min_level_gap(mut self, gap: f32) -> Self {
        self.min_level_gap = gap;
        self
    }

    /// Set the margin used for synthesized thresholds.
    pub fn with_heading_margin(mut self, margin: f32) -> Self {
        self.heading_margin = margin;
        self
    }

    /// Set the minimum span length.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Set the maximum span length.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the word limit of the all-caps rule.
    pub fn with_max_caps_words(mut self, words: usize) -> Self {
        self.max_caps_words = words;
        self
    }

    /// Set the word limit for headings found by font size.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Enable or disable duplicate heading removal.
    pub fn with_dedupe_headings(mut self, dedupe: bool) -> Self {
        self.dedupe_headings = dedupe;
        self
    }

    /// Count spans instead of characters in the histogram.
    pub fn with_span_weighting(mut self) -> Self {
        self.weight_by_chars = false;
        self
    }
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            min_level_gap: 1.0,
            heading_margin: 1.0,
            default_body_size: 12.0,
            weight_by_chars: true,
            min_chars: 3,
            max_chars: 200,
            max_caps_words: 5,
            max_heading_words: 10,
            boilerplate_y_tolerance: 3.0,
            merge_gap_factor: 1.5,
            dedupe_headings: false,
        }
    }
}
