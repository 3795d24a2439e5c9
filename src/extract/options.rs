//! Extraction options and configuration.

use std::ops::RangeInclusive;

use crate::artifact::JsonFormat;
use crate::model::Granularity;

/// Default JPEG quality for rasterized pages.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// How page records are arranged in the document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One record per page, keyed by 1-based page number
    #[default]
    Paged,
    /// All pages concatenated into a single record
    Flattened,
}

/// What each page record contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// Fragment texts in reader order
    #[default]
    TextOnly,
    /// Image files plus neighbor records
    ImagesOnly,
    /// Image files merged with text in reading order
    TextAndImages,
    /// Image neighbor records plus the page's full text list
    TextWithImagePositions,
}

impl ContentMode {
    /// Whether this mode writes image files.
    pub fn writes_images(&self) -> bool {
        !matches!(self, ContentMode::TextOnly)
    }
}

/// Scope within which an image is written only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupScope {
    /// An image drawn on several pages is written for each page
    #[default]
    Page,
    /// An image is written the first time it is seen in the document
    Document,
}

/// Options for extracting a document.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Line or block fragments
    pub granularity: Granularity,

    /// Paged or flattened document record
    pub layout: Layout,

    /// Page record contents
    pub content: ContentMode,

    /// Image deduplication scope
    pub dedup: DedupScope,

    /// Trust reader order when locating image neighbors
    pub assume_sorted_input: bool,

    /// Pages to process
    pub pages: PageSelection,

    /// JSON output formatting
    pub json_format: JsonFormat,

    /// JPEG quality (1-100) for rasterized pages
    pub jpeg_quality: u8,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Produce one fragment per text line.
    pub fn by_lines(self) -> Self {
        self.with_granularity(Granularity::Line)
    }

    /// Produce one fragment per text block.
    pub fn by_blocks(self) -> Self {
        self.with_granularity(Granularity::Block)
    }

    /// Set the record layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Concatenate all pages into one record.
    pub fn flattened(self) -> Self {
        self.with_layout(Layout::Flattened)
    }

    /// Set the content mode.
    pub fn with_content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }

    /// Set the image deduplication scope.
    pub fn with_dedup(mut self, dedup: DedupScope) -> Self {
        self.dedup = dedup;
        self
    }

    /// Set whether fragments are trusted to be in top-to-bottom order.
    pub fn with_sorted_input(mut self, assume_sorted: bool) -> Self {
        self.assume_sorted_input = assume_sorted;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.pages = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.pages = PageSelection::Range(range);
        self
    }

    /// Set the JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Line,
            layout: Layout::Paged,
            content: ContentMode::TextOnly,
            dedup: DedupScope::Page,
            assume_sorted_input: true,
            pages: PageSelection::All,
            json_format: JsonFormat::Pretty,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Page selection for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Extract all pages
    #[default]
    All,
    /// Extract a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Extract specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Selected pages of a document, ascending.
    pub fn resolve(&self, page_count: u32) -> Vec<u32> {
        (1..=page_count).filter(|p| self.includes(*p)).collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => pages.extend(parse_page(start)?..=parse_page(end)?),
                None => pages.push(parse_page(part)?),
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err("Page numbers start at 1".to_string()),
        Ok(p) => Ok(p),
        Err(_) => Err(format!("Invalid page number: {:?}", s.trim())),
    }
}
