//! Error types for unpage library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unpage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting a document.
///
/// Every variant is fatal for the document being processed: the pipeline
/// stops at the first error and writes no record for that document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The document could not be opened or parsed.
    #[error("Cannot open document {}: {reason}", path.display())]
    DocumentOpen {
        /// Path of the input document (empty for in-memory input)
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error interpreting PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting an embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Content or image extraction failed for a specific page.
    #[error("Failed to read page {page}: {source}")]
    PageRead {
        /// 1-based page number
        page: u32,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// Output directory creation or file write failed.
    #[error("Failed to write {}: {source}", path.display())]
    ArtifactWrite {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error encoding an artifact (JSON, JPEG, PNG).
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The page rasterizer failed.
    #[error("Rasterization of page {page} failed: {reason}")]
    Rasterize {
        /// 1-based page number
        page: u32,
        /// Underlying cause
        reason: String,
    },
}

impl Error {
    /// Wrap an error as a failure of the given page.
    ///
    /// Errors that already carry a page are passed through unchanged.
    pub fn on_page(self, page: u32) -> Self {
        match self {
            Error::PageRead { .. } => self,
            other => Error::PageRead {
                page,
                source: Box::new(other),
            },
        }
    }

    /// Page number this error is attached to, if any.
    pub fn page(&self) -> Option<u32> {
        match self {
            Error::PageRead { page, .. } | Error::Rasterize { page, .. } => Some(*page),
            Error::PageOutOfRange(page, _) => Some(*page),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encode(format!("JSON serialization error: {}", err))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(format!("image encoding error: {}", err))
    }
}
