//! Error types for pdfoutline.

use std::io;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting an outline.
///
/// Conditions that still yield a well-formed outline (an empty document,
/// a single font size, no title on the first page) are not errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version we do not recognize.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The document cannot be parsed into text spans.
    #[error("Malformed PDF: {0}")]
    Malformed(String),

    /// The document is encrypted and could not be decrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range string.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The heuristic configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error while serializing the outline.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error means the input itself could not be parsed.
    ///
    /// Batch processing logs these as warnings about the file; any other
    /// failure (such as an unwritable output) is logged as an error.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::Malformed(_)
                | Error::Encrypted
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Malformed("bad xref".to_string());
        assert_eq!(err.to_string(), "Malformed PDF: bad xref");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_input_error_classification() {
        assert!(Error::UnknownFormat.is_input_error());
        assert!(Error::Malformed(String::new()).is_input_error());
        assert!(Error::Encrypted.is_input_error());
        assert!(!Error::InvalidConfig(String::new()).is_input_error());
    }
}
