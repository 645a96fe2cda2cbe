//! Document-level information from the trailer and Info dictionary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::backend::{decode_pdf_string, LopdfBackend};

/// Facts about a PDF file, independent of its outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentInfo {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Number of pages
    pub page_count: u32,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// Info dictionary title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    /// Read the information of a loaded document.
    pub fn read(backend: &LopdfBackend) -> Self {
        let doc = backend.raw_doc();
        let mut info = DocumentInfo {
            version: backend.version(),
            page_count: backend.page_count(),
            encrypted: backend.is_encrypted(),
            ..Default::default()
        };

        let dict = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| obj.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());

        if let Some(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.created = get_string_from_dict(dict, b"CreationDate")
                .as_deref()
                .and_then(parse_pdf_date);
            info.modified = get_string_from_dict(dict, b"ModDate")
                .as_deref()
                .and_then(parse_pdf_date);
        }

        info
    }
}

/// Read a text string from a dictionary, dropping empty values.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    let text = match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => decode_pdf_string(bytes),
        lopdf::Object::Name(bytes) => String::from_utf8_lossy(bytes).to_string(),
        _ => return None,
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
///
/// The timezone suffix is ignored.
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    // At minimum we need YYYY
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| -> u32 {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}
