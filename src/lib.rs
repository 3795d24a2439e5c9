//! # unpage
//!
//! Positional text and image extraction from PDF pages.
//!
//! Each page is read as text fragments (lines or blocks) and embedded
//! images, all with bounding boxes in top-down page coordinates. From those
//! the crate rebuilds a vertical reading order that interleaves text and
//! images, or finds the text directly above and below every image. Results
//! are written as JSON records next to the extracted image files.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unpage::{extract_file, ContentMode, ExtractOptions};
//!
//! fn main() -> unpage::Result<()> {
//!     let options = ExtractOptions::new()
//!         .by_blocks()
//!         .with_content(ContentMode::TextAndImages);
//!
//!     let report = extract_file("paper.pdf", "out", options)?;
//!     println!("{} -> {}", report.document_name, report.record_name);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: text and images merged by vertical position
//! - **Image neighbors**: preceding and following text of every image
//! - **Line or block granularity** for text fragments
//! - **Paged or flattened** JSON records
//! - **Pluggable I/O**: bring your own [`PageContentReader`],
//!   [`ArtifactWriter`] or [`PageRasterizer`]

pub mod artifact;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod order;
pub mod parser;

// Re-export commonly used types
pub use artifact::{ArtifactWriter, FsArtifactWriter, JsonFormat, MemoryArtifactWriter, OutputContext};
pub use detect::{is_pdf_bytes, read_header, read_header_from_path, PdfHeader};
pub use error::{Error, Result};
pub use extract::{
    rasterize_pages, ContentMode, DedupScope, ExtractOptions, ExtractionPipeline,
    ExtractionReport, Layout, PageRasterizer, PageSelection,
};
pub use model::{
    BoundingBox, DocumentRecord, Entry, Granularity, ImageId, ImageNeighbors, ImagePlacement,
    ImageRecord, PageRecord, TextFragment,
};
pub use order::{locate, merge, Locator};
pub use parser::{LopdfReader, PageContentReader};

use std::path::{Path, PathBuf};

/// Extract a PDF file into an output directory.
///
/// The directory is created if needed. Artifacts are named after the input
/// file (see [`artifact::naming`]).
///
/// # Example
///
/// ```no_run
/// use unpage::{extract_file, ExtractOptions};
///
/// let report = extract_file("document.pdf", "out", ExtractOptions::default()).unwrap();
/// println!("Pages: {}", report.pages);
/// ```
pub fn extract_file<P, Q>(path: P, output_dir: Q, options: ExtractOptions) -> Result<ExtractionReport>
where
    P: AsRef<Path>,
    Q: Into<PathBuf>,
{
    let path = path.as_ref();
    let reader = LopdfReader::open(path)?;
    let mut writer = FsArtifactWriter::create(output_dir)?;
    ExtractionPipeline::new(reader, options).run(&mut writer, &path.to_string_lossy())
}

/// Extract a PDF held in memory through any artifact writer.
///
/// `document_name` stands in for the input file name when naming artifacts.
pub fn extract_bytes<W>(
    data: &[u8],
    document_name: &str,
    writer: &mut W,
    options: ExtractOptions,
) -> Result<ExtractionReport>
where
    W: ArtifactWriter + ?Sized,
{
    let reader = LopdfReader::from_bytes(data)?;
    ExtractionPipeline::new(reader, options).run(writer, document_name)
}

/// Write every distinct image of a PDF file once, with no JSON record.
///
/// Returns the written file names.
pub fn extract_unique_images<P, Q>(path: P, output_dir: Q) -> Result<Vec<String>>
where
    P: AsRef<Path>,
    Q: Into<PathBuf>,
{
    let path = path.as_ref();
    let reader = LopdfReader::open(path)?;
    let mut writer = FsArtifactWriter::create(output_dir)?;
    ExtractionPipeline::new(reader, ExtractOptions::default())
        .extract_unique_images(&mut writer, &path.to_string_lossy())
}

/// Builder-style API for extraction.
///
/// # Example
///
/// ```no_run
/// use unpage::Unpage;
///
/// let report = Unpage::new()
///     .by_blocks()
///     .flattened()
///     .text_and_images()
///     .extract("document.pdf", "out")?;
/// # Ok::<(), unpage::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unpage {
    options: ExtractOptions,
}

impl Unpage {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// One fragment per text line.
    pub fn by_lines(mut self) -> Self {
        self.options = self.options.by_lines();
        self
    }

    /// One fragment per text block.
    pub fn by_blocks(mut self) -> Self {
        self.options = self.options.by_blocks();
        self
    }

    /// Concatenate all pages into one record.
    pub fn flattened(mut self) -> Self {
        self.options = self.options.flattened();
        self
    }

    /// Page texts only.
    pub fn text_only(mut self) -> Self {
        self.options = self.options.with_content(ContentMode::TextOnly);
        self
    }

    /// Image files and their neighbor records.
    pub fn images_only(mut self) -> Self {
        self.options = self.options.with_content(ContentMode::ImagesOnly);
        self
    }

    /// Image files merged into the text reading order.
    pub fn text_and_images(mut self) -> Self {
        self.options = self.options.with_content(ContentMode::TextAndImages);
        self
    }

    /// Image neighbor records plus page text.
    pub fn with_image_positions(mut self) -> Self {
        self.options = self.options.with_content(ContentMode::TextWithImagePositions);
        self
    }

    /// Write each image once per document instead of once per page.
    pub fn dedup_document(mut self) -> Self {
        self.options = self.options.with_dedup(DedupScope::Document);
        self
    }

    /// Sort fragments before locating image neighbors.
    pub fn sort_fragments(mut self) -> Self {
        self.options = self.options.with_sorted_input(false);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.options = self.options.with_json_format(JsonFormat::Compact);
        self
    }

    /// Set the JPEG quality (1-100) for rasterized pages.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.options = self.options.with_jpeg_quality(quality);
        self
    }

    /// Get the accumulated options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract a PDF file into an output directory.
    pub fn extract<P, Q>(self, path: P, output_dir: Q) -> Result<ExtractionReport>
    where
        P: AsRef<Path>,
        Q: Into<PathBuf>,
    {
        extract_file(path, output_dir, self.options)
    }

    /// Render every page to `{base}_page_{n}.jpg` at the configured quality.
    pub fn rasterize<P, W>(&self, rasterizer: &mut P, writer: &mut W, document_name: &str) -> Result<Vec<String>>
    where
        P: PageRasterizer + ?Sized,
        W: ArtifactWriter + ?Sized,
    {
        rasterize_pages(rasterizer, writer, document_name, self.options.jpeg_quality)
    }

    /// Extract an in-memory PDF through a writer.
    pub fn extract_bytes<W>(self, data: &[u8], document_name: &str, writer: &mut W) -> Result<ExtractionReport>
    where
        W: ArtifactWriter + ?Sized,
    {
        extract_bytes(data, document_name, writer, self.options)
    }
}
