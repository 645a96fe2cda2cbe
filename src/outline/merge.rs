//! Same-line span merging.
//!
//! A heading is often drawn as several font runs ("Chapter " in bold
//! followed by "1" in regular weight). Spans that share a visual line and
//! touch horizontally are merged into one before anything is classified.

use crate::model::TextSpan;

use super::text::is_spaceless_script_char;

/// Sort spans into reading order and merge adjacent runs on the same line.
///
/// Output order is page ascending, lines top to bottom, spans left to right.
/// `gap_factor` bounds the horizontal gap between runs, in multiples of the
/// font size.
pub fn merge_lines(spans: &[TextSpan], gap_factor: f32) -> Vec<TextSpan> {
    let mut merged = Vec::with_capacity(spans.len());
    for line in group_lines(spans) {
        let mut iter = line.into_iter();
        let Some(mut current) = iter.next() else {
            continue;
        };
        for span in iter {
            if is_adjacent(&current, &span, gap_factor) {
                current = merge_pair(current, &span);
            } else {
                merged.push(std::mem::replace(&mut current, span));
            }
        }
        merged.push(current);
    }
    merged
}

/// Group spans into visual lines, each sorted left to right.
fn group_lines(spans: &[TextSpan]) -> Vec<Vec<TextSpan>> {
    let mut sorted: Vec<TextSpan> = spans.to_vec();
    // PDF Y grows upwards, so descending Y is top to bottom.
    sorted.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| b.y.total_cmp(&a.y))
            .then_with(|| a.x.total_cmp(&b.x))
    });

    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in sorted {
        let same_line = current.first().is_some_and(|anchor| {
            let tolerance = anchor.font_size.max(span.font_size) * 0.3;
            anchor.page == span.page && (anchor.y - span.y).abs() <= tolerance
        });
        if !same_line && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

fn is_adjacent(prev: &TextSpan, next: &TextSpan, gap_factor: f32) -> bool {
    if prev.page != next.page || !prev.overlaps_vertically(next) {
        return false;
    }
    let gap = next.x - prev.right();
    let size = prev.font_size.max(next.font_size);
    // Slight overlap happens when estimated widths run long.
    gap <= size * gap_factor && gap >= -size
}

fn merge_pair(prev: TextSpan, next: &TextSpan) -> TextSpan {
    let mut text = prev.text.clone();
    if needs_space(&prev, next) {
        text.push(' ');
    }
    text.push_str(&next.text);

    let right = prev.right().max(next.right());
    TextSpan {
        text,
        font_size: prev.font_size.max(next.font_size),
        is_bold: prev.is_bold || next.is_bold,
        page: prev.page,
        x: prev.x,
        y: prev.y,
        width: right - prev.x,
        font_name: prev.font_name,
    }
}

/// Whether a word space separates two runs.
fn needs_space(prev: &TextSpan, next: &TextSpan) -> bool {
    let prev_ends_with_space = prev.text.ends_with(char::is_whitespace);
    let next_starts_with_space = next.text.starts_with(char::is_whitespace);
    if prev_ends_with_space || next_starts_with_space {
        return false;
    }

    let char_count = next.text.chars().count();
    let avg_char_width = if char_count > 0 && next.width > 0.0 {
        next.width / char_count as f32
    } else {
        next.font_size * 0.5
    };
    let gap = next.x - prev.right();
    if gap <= avg_char_width * 0.2 {
        return false;
    }

    let prev_cjk = prev.text.chars().last().is_some_and(is_spaceless_script_char);
    let next_cjk = next.text.chars().next().is_some_and(is_spaceless_script_char);
    !(prev_cjk && next_cjk)
}
