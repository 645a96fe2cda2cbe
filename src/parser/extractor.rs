//! Content stream walker producing [`TextSpan`]s.
//!
//! Implements the subset of the PDF text state machine that matters for
//! layout: text matrices, leading, font selection and the four show
//! operators. Glyph widths are estimated, not measured.

use crate::error::{Error, Result};
use crate::model::{estimate_width, TextSpan};
use crate::outline::is_spaceless_script_char;

use super::backend::{PageFont, PageId, PdfBackend, PdfValue};
use super::options::{ErrorMode, PageSelection, ParseOptions};

/// TJ adjustment (thousandths of text space) that counts as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Size assumed when a show operator appears before any `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Extracts text spans from every selected page of a document.
pub struct SpanExtractor<'a, B: PdfBackend> {
    backend: &'a B,
    options: &'a ParseOptions,
}

impl<'a, B: PdfBackend> SpanExtractor<'a, B> {
    /// Create an extractor over a loaded backend.
    pub fn new(backend: &'a B, options: &'a ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Extract spans from all selected pages, in reading order.
    ///
    /// In strict mode the first page that fails aborts the document with
    /// [`Error::Malformed`]; in lenient mode the page is logged and skipped.
    pub fn extract(&self) -> Result<Vec<TextSpan>> {
        let pages = self.backend.pages();
        let total = pages.len() as u32;

        if let PageSelection::Pages(selected) = &self.options.pages {
            if let Some(&missing) = selected.iter().find(|p| **p > total) {
                return Err(Error::PageOutOfRange(missing, total));
            }
        }

        let mut spans = Vec::new();
        for (&page_num, &page_id) in &pages {
            if !self.options.pages.includes(page_num) {
                continue;
            }
            match self.extract_page(page_num, page_id) {
                Ok(page_spans) => spans.extend(page_spans),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
                Err(e) => {
                    return Err(Error::Malformed(format!("page {}: {}", page_num, e)));
                }
            }
        }

        sort_reading_order(&mut spans);
        log::debug!("Extracted {} spans from {} page(s)", spans.len(), total);
        Ok(spans)
    }

    /// Extract the spans of a single page (1-based number).
    pub fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Vec<TextSpan>> {
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        let fonts = self.backend.page_fonts(page_id)?;

        let mut state = TextState::default();
        let mut spans = Vec::new();

        for op in &ops {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "BT" => {
                    state.in_text = true;
                    state.text_matrix = IDENTITY;
                    state.line_matrix = IDENTITY;
                }
                "ET" => {
                    state.in_text = false;
                }
                "Tf" => {
                    if let [PdfValue::Name(key), size, ..] = operands {
                        state.font = fonts.iter().position(|f| f.key == *key);
                        state.font_name = match state.font {
                            Some(index) => fonts[index].base_font.clone(),
                            None => String::from_utf8_lossy(key).to_string(),
                        };
                        state.is_bold = state.current_font(&fonts).is_some_and(PageFont::is_bold);
                        state.font_size = size.as_number().unwrap_or(DEFAULT_FONT_SIZE);
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands {
                        let tx = tx.as_number().unwrap_or(0.0);
                        let ty = ty.as_number().unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.translate_line(tx, ty);
                    }
                }
                "Tm" => {
                    let values: Vec<f32> = operands
                        .iter()
                        .take(6)
                        .filter_map(PdfValue::as_number)
                        .collect();
                    if let [a, b, c, d, e, f] = values[..] {
                        state.text_matrix = [a, b, c, d, e, f];
                        state.line_matrix = state.text_matrix;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(PdfValue::as_number) {
                        state.leading = leading;
                    }
                }
                "T*" => {
                    state.next_line();
                }
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = operands.first() {
                        let text = self.backend.decode_text(state.current_font(&fonts), bytes);
                        state.show(text, page_num, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = operands.first() {
                        let text = self.combine_tj(state.current_font(&fonts), items);
                        state.show(text, page_num, &mut spans);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = operands.get(text_idx) {
                        let text = self.backend.decode_text(state.current_font(&fonts), bytes);
                        state.show(text, page_num, &mut spans);
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Join the strings of a `TJ` array, turning wide kerning into spaces.
    fn combine_tj(&self, font: Option<&PageFont>, items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    combined.push_str(&self.backend.decode_text(font, bytes));
                }
                other => {
                    let Some(adjustment) = other.as_number() else {
                        continue;
                    };
                    // Negative adjustments move the pen right.
                    if -adjustment > TJ_SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// Sort spans into reading order: page, then top to bottom, then left to right.
pub fn sort_reading_order(spans: &mut [TextSpan]) {
    spans.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| b.y.total_cmp(&a.y))
            .then_with(|| a.x.total_cmp(&b.x))
    });
}

/// Identity text matrix `[a, b, c, d, e, f]`.
const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    in_text: bool,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    leading: f32,
    /// Index of the selected font in the page's font list
    font: Option<usize>,
    font_name: String,
    is_bold: bool,
    font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            in_text: false,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            font: None,
            font_name: String::new(),
            is_bold: false,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextState {
    fn current_font<'f>(&self, fonts: &'f [PageFont]) -> Option<&'f PageFont> {
        self.font.and_then(|index| fonts.get(index))
    }

    fn translate_line(&mut self, tx: f32, ty: f32) {
        let m = self.line_matrix;
        self.line_matrix[4] = m[0] * tx + m[2] * ty + m[4];
        self.line_matrix[5] = m[1] * tx + m[3] * ty + m[5];
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.translate_line(0.0, -leading);
    }

    /// Vertical scale of the text matrix applied to the font size.
    fn effective_size(&self) -> f32 {
        let m = self.text_matrix;
        (self.font_size * (m[1] * m[1] + m[3] * m[3]).sqrt()).abs()
    }

    fn advance(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Emit a span for shown text and move the pen past it.
    fn show(&mut self, text: String, page: u32, spans: &mut Vec<TextSpan>) {
        if !self.in_text {
            return;
        }
        let advance = estimate_width(&text, self.font_size);
        let size = self.effective_size();
        let (x, y) = (self.text_matrix[4], self.text_matrix[5]);
        if ![x, y, size].iter().all(|v| v.is_finite()) {
            log::debug!("Dropping span {:?} on page {} with non-finite geometry", text, page);
        } else if !text.trim().is_empty() {
            let span = TextSpan {
                width: estimate_width(&text, size),
                is_bold: self.is_bold,
                font_name: self.font_name.clone(),
                font_size: size,
                page,
                x,
                y,
                text,
            };
            spans.push(span);
        }
        self.advance(advance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::backend::{decode_pdf_string, ContentOp};
    use std::collections::BTreeMap;

    /// Backend serving pre-decoded operations, one list per page.
    struct FakeBackend {
        pages: Vec<Option<Vec<ContentOp>>>,
        fonts_fail: bool,
    }

    impl PdfBackend for FakeBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32).map(|n| (n, (n, 0))).collect()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<PageFont>> {
            if self.fonts_fail {
                return Err(Error::Malformed("missing font resource".to_string()));
            }
            Ok(vec![
                PageFont::new(b"F1".to_vec(), "Helvetica"),
                PageFont::new(b"F2".to_vec(), "Helvetica-Bold"),
                PageFont::new(b"F3".to_vec(), "Courier"),
            ])
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            Ok(page.0.to_be_bytes().to_vec())
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            let index = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize - 1;
            self.pages[index]
                .clone()
                .ok_or_else(|| Error::Malformed("broken stream".to_string()))
        }

        fn decode_text(&self, font: Option<&PageFont>, bytes: &[u8]) -> String {
            // Marks which font each string was decoded with.
            match font {
                Some(f) if f.key == b"F3" => decode_pdf_string(bytes).to_uppercase(),
                _ => decode_pdf_string(bytes),
            }
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn name(s: &str) -> PdfValue {
        PdfValue::Name(s.as_bytes().to_vec())
    }

    fn string(s: &str) -> PdfValue {
        PdfValue::Str(s.as_bytes().to_vec())
    }

    fn num(n: f32) -> PdfValue {
        PdfValue::Real(n)
    }

    fn page_ops() -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), num(24.0)]),
            op("Td", vec![num(72.0), num(720.0)]),
            op("Tj", vec![string("Title")]),
            op("Tf", vec![name("F1"), num(11.0)]),
            op("TL", vec![num(14.0)]),
            op("T*", vec![]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    string("Hello"),
                    PdfValue::Integer(-300),
                    string("world"),
                ])],
            ),
            op("ET", vec![]),
        ]
    }

    #[test]
    fn test_spans_with_positions_and_fonts() {
        let backend = FakeBackend {
            pages: vec![Some(page_ops())],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Title");
        assert!(spans[0].is_bold);
        assert!((spans[0].font_size - 24.0).abs() < f32::EPSILON);
        assert!((spans[0].x - 72.0).abs() < f32::EPSILON);
        assert!((spans[0].y - 720.0).abs() < f32::EPSILON);

        assert_eq!(spans[1].text, "Hello world");
        assert!(!spans[1].is_bold);
        assert!((spans[1].y - 706.0).abs() < f32::EPSILON);
        assert!((spans[1].x - 72.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_matrix_scale_sets_effective_size() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(1.0)]),
            op(
                "Tm",
                vec![num(18.0), num(0.0), num(0.0), num(18.0), num(100.0), num(500.0)],
            ),
            op("Tj", vec![string("Scaled")]),
            op("ET", vec![]),
        ];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert!((spans[0].font_size - 18.0).abs() < f32::EPSILON);
        assert!((spans[0].x - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_consecutive_runs_are_adjacent() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F2"), num(18.0)]),
            op("Td", vec![num(72.0), num(600.0)]),
            op("Tj", vec![string("Chapter ")]),
            op("Tf", vec![name("F1"), num(18.0)]),
            op("Tj", vec![string("1")]),
            op("ET", vec![]),
        ];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert_eq!(spans.len(), 2);
        assert!((spans[1].x - spans[0].right()).abs() < 0.01);
        assert!((spans[1].y - spans[0].y).abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let ops = vec![op("Tj", vec![string("stray")])];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_strict_mode_fails_on_broken_page() {
        let backend = FakeBackend {
            pages: vec![Some(page_ops()), None],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let result = SpanExtractor::new(&backend, &options).extract();
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_lenient_mode_skips_broken_page() {
        let backend = FakeBackend {
            pages: vec![None, Some(page_ops())],
            fonts_fail: false,
        };
        let options = ParseOptions::new().lenient();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.page == 2));
    }

    #[test]
    fn test_page_selection() {
        let backend = FakeBackend {
            pages: vec![Some(page_ops()), Some(page_ops()), Some(page_ops())],
            fonts_fail: false,
        };
        let options = ParseOptions::new().with_pages(PageSelection::Range(2..=2));
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert!(spans.iter().all(|s| s.page == 2));

        let options = ParseOptions::new().with_pages(PageSelection::Pages(vec![1, 9]));
        let result = SpanExtractor::new(&backend, &options).extract();
        assert!(matches!(result, Err(Error::PageOutOfRange(9, 3))));
    }

    #[test]
    fn test_strings_decode_with_selected_font() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F3"), num(12.0)]),
            op("Td", vec![num(72.0), num(600.0)]),
            op("Tj", vec![string("mono")]),
            op("Tf", vec![name("F1"), num(12.0)]),
            op("TJ", vec![PdfValue::Array(vec![string("plain")])]),
            op("ET", vec![]),
        ];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert_eq!(spans[0].text, "MONO");
        assert_eq!(spans[0].font_name, "Courier");
        assert_eq!(spans[1].text, "plain");
    }

    #[test]
    fn test_unknown_font_key_keeps_name() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F9"), num(12.0)]),
            op("Tj", vec![string("orphan")]),
            op("ET", vec![]),
        ];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert_eq!(spans[0].font_name, "F9");
        assert!(!spans[0].is_bold);
    }

    #[test]
    fn test_font_resource_failure_fails_page() {
        let backend = FakeBackend {
            pages: vec![Some(page_ops())],
            fonts_fail: true,
        };
        let options = ParseOptions::default();
        let result = SpanExtractor::new(&backend, &options).extract();
        assert!(matches!(result, Err(Error::Malformed(_))));

        let options = ParseOptions::new().lenient();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_non_finite_geometry_dropped() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![name("F1"), num(12.0)]),
            op(
                "Tm",
                vec![num(1.0), num(0.0), num(0.0), num(f32::INFINITY), num(72.0), num(500.0)],
            ),
            op("Tj", vec![string("scaled away")]),
            op(
                "Tm",
                vec![num(1.0), num(0.0), num(0.0), num(1.0), num(f32::NAN), num(480.0)],
            ),
            op("Tj", vec![string("nowhere")]),
            op(
                "Tm",
                vec![num(1.0), num(0.0), num(0.0), num(1.0), num(72.0), num(460.0)],
            ),
            op("Tj", vec![string("visible")]),
            op("ET", vec![]),
        ];
        let backend = FakeBackend {
            pages: vec![Some(ops)],
            fonts_fail: false,
        };
        let options = ParseOptions::default();
        let spans = SpanExtractor::new(&backend, &options).extract().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "visible");
        assert!(spans[0].x.is_finite() && spans[0].y.is_finite());
    }

    #[test]
    fn test_reading_order_with_nan() {
        let mut spans: Vec<TextSpan> = (0..30)
            .map(|i| {
                let y = if i % 7 == 0 { f32::NAN } else { 700.0 - i as f32 * 10.0 };
                TextSpan::new(format!("line {}", i), 11.0, 1 + i % 2, 72.0, y)
            })
            .collect();
        sort_reading_order(&mut spans);
        assert!(spans.windows(2).all(|w| w[0].page <= w[1].page));
    }
}
