//! Text span type.

use serde::{Deserialize, Serialize};

/// A run of uniformly styled text on one page.
///
/// Coordinates are PDF user-space units with the origin at the bottom-left
/// corner of the page, so a larger `y` is higher on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// 1-based page number
    pub page: u32,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated advance width of the text
    #[serde(default)]
    pub width: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_name: String,
}

impl TextSpan {
    /// Create a span with an estimated width of half the font size per character.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32, x: f32, y: f32) -> Self {
        let text = text.into();
        let width = estimate_width(&text, font_size);
        Self {
            text,
            font_size,
            is_bold: false,
            page,
            x,
            y,
            width,
            font_name: String::new(),
        }
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, is_bold: bool) -> Self {
        self.is_bold = is_bold;
        self
    }

    /// Set the width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the font name and infer boldness from it.
    pub fn with_font_name(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self.is_bold = self.is_bold || is_bold_font_name(&self.font_name);
        self
    }

    /// Whether position, size and width are all finite numbers.
    pub fn has_finite_geometry(&self) -> bool {
        [self.x, self.y, self.font_size, self.width]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2 // Approximate descender
    }

    /// Top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8 // Approximate ascender
    }

    /// Whether the vertical extents of two spans overlap.
    pub fn overlaps_vertically(&self, other: &TextSpan) -> bool {
        self.bottom() < other.top() && other.bottom() < self.top()
    }

    /// Number of non-whitespace characters.
    pub fn visible_len(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// Estimate the advance width of `text` without font metrics.
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// Whether a base font name denotes a bold weight.
pub fn is_bold_font_name(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|marker| lower.contains(marker))
}
