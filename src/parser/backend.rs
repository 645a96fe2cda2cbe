//! PDF backend abstraction layer.
//!
//! [`PdfBackend`] is the seam between span extraction and the PDF library.
//! The extractor only sees pages, font resources, decoded operators and
//! decoded strings; [`LopdfBackend`] supplies them from `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::detect::sniff_bytes;
use crate::error::{Error, Result};
use crate::model::is_bold_font_name;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A font resource of one page, resolved once per page.
#[derive(Debug, Clone)]
pub struct PageFont {
    /// Resource key used by `Tf` (e.g. `F1`)
    pub key: Vec<u8>,
    /// Base font name (e.g. "Helvetica-Bold")
    pub base_font: String,
    dict: Option<Dictionary>,
}

impl PageFont {
    /// Font without an encoding dictionary; text decodes with [`decode_pdf_string`].
    pub fn new(key: impl Into<Vec<u8>>, base_font: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_font: base_font.into(),
            dict: None,
        }
    }

    /// Whether the base font name marks a bold face.
    pub fn is_bold(&self) -> bool {
        is_bold_font_name(&self.base_font)
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// Document access needed by the span extractor.
pub trait PdfBackend {
    /// All pages as page number (1-based) to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Font resources of a page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>>;

    /// Content stream bytes of a page, filters already applied.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse content stream bytes into operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a shown string with the current font, if one is selected.
    fn decode_text(&self, font: Option<&PageFont>, bytes: &[u8]) -> String;
}

/// Decode a PDF string without font information.
///
/// UTF-16BE when the string starts with a byte order mark, UTF-8 when
/// valid, Latin-1 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    ///
    /// The PDF header is checked first so non-PDF input fails with
    /// [`Error::UnknownFormat`] rather than a parser message.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }
        Ok(Self { doc })
    }

    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::load_bytes(&std::fs::read(path)?)
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// The underlying document, for trailer and Info dictionary access.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// PDF version from the header (e.g. "1.7").
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Bytes of one content stream object.
    fn stream_content(&self, object: &Object) -> Result<Vec<u8>> {
        let stream = match object {
            Object::Reference(id) => self.doc.get_object(*id)?.as_stream()?,
            Object::Stream(stream) => stream,
            other => {
                return Err(Error::Malformed(format!(
                    "content entry is not a stream: {:?}",
                    other
                )))
            }
        };
        if stream.dict.has(b"Filter") {
            Ok(stream.decompressed_content()?)
        } else {
            Ok(stream.content.clone())
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>> {
        let fonts = self.doc.get_page_fonts(page)?;
        Ok(fonts
            .into_iter()
            .map(|(key, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .and_then(Object::as_name)
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|_| "Unknown".to_string());
                PageFont {
                    key,
                    base_font,
                    dict: Some(dict.clone()),
                }
            })
            .collect())
    }

    /// Concatenated content of the page. Any stream that cannot be read
    /// fails the whole page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        let contents = self.doc.get_dictionary(page)?.get(b"Contents")?;
        match contents {
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    content.extend(self.stream_content(part)?);
                    content.push(b'\n');
                }
                Ok(content)
            }
            single => self.stream_content(single),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let operations = lopdf::content::Content::decode(data)?.operations;
        let ops = operations
            .into_iter()
            .map(|operation| ContentOp {
                operands: operation.operands.iter().map(PdfValue::from).collect(),
                operator: operation.operator,
            })
            .collect();
        Ok(ops)
    }

    fn decode_text(&self, font: Option<&PageFont>, bytes: &[u8]) -> String {
        font.and_then(|f| f.dict.as_ref())
            .and_then(|dict| dict.get_font_encoding(&self.doc).ok())
            .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_pdf_string(bytes))
    }
}

impl From<&Object> for PdfValue {
    fn from(object: &Object) -> Self {
        match object {
            Object::Integer(value) => PdfValue::Integer(*value),
            Object::Real(value) => PdfValue::Real(*value),
            Object::Name(name) => PdfValue::Name(name.clone()),
            Object::String(bytes, _) => PdfValue::Str(bytes.clone()),
            Object::Array(items) => PdfValue::Array(items.iter().map(PdfValue::from).collect()),
            _ => PdfValue::Other,
        }
    }
}
