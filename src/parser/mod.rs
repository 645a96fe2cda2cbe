//! PDF parsing: loading, span extraction and document information.

mod backend;
mod extractor;
mod info;
mod options;

pub use backend::{
    decode_pdf_string, ContentOp, LopdfBackend, PageFont, PageId, PdfBackend, PdfValue,
};
pub use extractor::{sort_reading_order, SpanExtractor};
pub use info::DocumentInfo;
pub use options::{ErrorMode, PageSelection, ParseOptions};
