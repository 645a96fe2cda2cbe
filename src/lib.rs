//! # pdfoutline
//!
//! Title and heading outline extraction from PDF documents, driven purely by
//! typography and layout: font sizes, text patterns and positions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_file("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! The output always has the shape
//! `{"title": "...", "outline": [{"level": "H1", "text": "...", "page": 1}]}`.
//!
//! ## Pipeline
//!
//! - **Span extraction**: lopdf content streams to [`TextSpan`]s
//! - **Font profiling**: body size and H1/H2/H3 thresholds per document
//! - **Title detection**: most prominent text on the first page
//! - **Heading classification**: numbering, font size, then all-caps rules
//!
//! The heuristic stages work on plain spans, so they can be driven without
//! a PDF through [`OutlinePipeline`].

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchEvent, BatchOutcome, BatchReport, BatchRunner};
pub use detect::{is_pdf_bytes, sniff_bytes, PdfHeader};
pub use error::{Error, Result};
pub use model::{HeadingCandidate, HeadingLevel, Outline, TextSpan};
pub use outline::{Analysis, FontProfile, OutlineConfig, OutlinePipeline, SpanDecision};
pub use parser::{DocumentInfo, ErrorMode, PageSelection, ParseOptions};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

use parser::{LopdfBackend, SpanExtractor};

/// Extract the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// let outline = pdfoutline::extract_file("report.pdf")?;
/// println!("{}", outline.title_str());
/// # Ok::<(), pdfoutline::Error>(())
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Extractor::new().extract_file(path)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_bytes(data: &[u8]) -> Result<Outline> {
    Extractor::new().extract_bytes(data)
}

/// Extract the outline of a PDF read from `reader`.
pub fn extract_reader<R: Read>(reader: R) -> Result<Outline> {
    Extractor::new().extract_reader(reader)
}

/// Convert a PDF file straight to outline JSON.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty)?;
/// std::fs::write("report.json", json)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = extract_file(path)?;
    render::to_json(&outline, format)
}

/// Builder combining extraction options and the outline heuristic.
///
/// An `Extractor` holds no per-document state and can be shared across
/// threads.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{Extractor, OutlineConfig};
///
/// let outline = Extractor::new()
///     .with_config(OutlineConfig::new().with_dedupe_headings(true))?
///     .lenient()
///     .extract_file("report.pdf")?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug)]
pub struct Extractor {
    parse_options: ParseOptions,
    pipeline: OutlinePipeline,
}

impl Extractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            pipeline: OutlinePipeline::default(),
        }
    }

    /// Use a custom heuristic configuration.
    pub fn with_config(mut self, config: OutlineConfig) -> Result<Self> {
        self.pipeline = OutlinePipeline::new(config)?;
        Ok(self)
    }

    /// Use a prepared pipeline (for example with a custom rule chain).
    pub fn with_pipeline(mut self, pipeline: OutlinePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Skip unreadable pages instead of failing the document.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Process batch files one after another.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Only read the selected pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Extraction options in use.
    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    /// Heuristic pipeline in use.
    pub fn pipeline(&self) -> &OutlinePipeline {
        &self.pipeline
    }

    /// Extract the outline of a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        let spans = self.spans_from_file(path)?;
        Ok(self.pipeline.run(&spans))
    }

    /// Extract the outline of a PDF held in memory.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Outline> {
        let spans = self.spans_from_bytes(data)?;
        Ok(self.pipeline.run(&spans))
    }

    /// Extract the outline of a PDF read from `reader`.
    pub fn extract_reader<R: Read>(&self, reader: R) -> Result<Outline> {
        let backend = LopdfBackend::load_reader(reader)?;
        let spans = self.spans(&backend)?;
        Ok(self.pipeline.run(&spans))
    }

    /// Run the pipeline on a PDF file and keep every intermediate decision.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let spans = self.spans_from_file(path)?;
        Ok(self.pipeline.analyze(&spans))
    }

    /// Raw spans of a PDF file in reading order, before line merging.
    pub fn spans_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<TextSpan>> {
        let path = path.as_ref();
        log::debug!("Reading {}", path.display());
        let backend = LopdfBackend::load_file(path)?;
        self.spans(&backend)
    }

    /// Raw spans of an in-memory PDF in reading order, before line merging.
    pub fn spans_from_bytes(&self, data: &[u8]) -> Result<Vec<TextSpan>> {
        let backend = LopdfBackend::load_bytes(data)?;
        self.spans(&backend)
    }

    fn spans(&self, backend: &LopdfBackend) -> Result<Vec<TextSpan>> {
        SpanExtractor::new(backend, &self.parse_options).extract()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Read page count, version and Info-dictionary metadata of a PDF file.
pub fn document_info<P: AsRef<Path>>(path: P) -> Result<DocumentInfo> {
    let backend = LopdfBackend::load_file(path)?;
    Ok(DocumentInfo::read(&backend))
}
