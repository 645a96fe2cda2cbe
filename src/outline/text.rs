//! Text helpers shared by the outline stages.

use unicode_normalization::UnicodeNormalization;

/// Normalize heading or title text for output.
///
/// NFC-normalizes, trims, collapses whitespace runs to a single space and
/// strips one trailing lone period ("Report." becomes "Report", "Etc..."
/// is left alone).
pub fn clean_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    let mut cleaned = collapse_whitespace(&normalized);

    if cleaned.ends_with('.') && !cleaned.ends_with("..") {
        cleaned.pop();
        let trimmed_len = cleaned.trim_end().len();
        cleaned.truncate(trimmed_len);
    }

    cleaned
}

/// Trim and collapse every whitespace run (including NBSP) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used to compare span texts for repetition (boilerplate, duplicates).
pub fn comparison_key(text: &str) -> String {
    collapse_whitespace(&text.nfc().collect::<String>())
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether every letter is uppercase, ignoring non-letters.
///
/// Text without any letter is not uppercase.
pub fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
