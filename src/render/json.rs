//! JSON rendering of outlines.
//!
//! The output shape is fixed:
//!
//! ```json
//! {
//!   "title": "...",
//!   "outline": [{"level": "H1", "text": "...", "page": 1}]
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::Outline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    to_json_value(outline, format)
}

/// Write an outline as JSON followed by a newline.
pub fn write_json<W: Write>(outline: &Outline, format: JsonFormat, mut writer: W) -> Result<()> {
    let json = to_json(outline, format)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Serialize any diagnostic value (spans, profiles) in the given format.
pub fn to_json_value<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
