//! Document extraction pipeline.
//!
//! For each selected page the pipeline asks the reader for fragments and
//! image placements, writes image files, applies the merger or locator and
//! stores a page record. The finished document record is encoded and
//! handed to the writer once, after the last page.

use std::collections::{BTreeMap, HashMap};

use crate::artifact::naming::{document_base_name, image_filename, record_name};
use crate::artifact::{to_json, ArtifactWriter};
use crate::error::Result;
use crate::model::{
    DocumentRecord, ImageId, ImagePlaceholder, ImagePlacement, ImageRecord, PageRecord,
    TextFragment,
};
use crate::order::{merge, Locator};
use crate::parser::PageContentReader;

use super::options::{ContentMode, DedupScope, ExtractOptions, Layout};

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Base name artifacts were named after
    pub document_name: String,
    /// Number of pages processed
    pub pages: u32,
    /// Image files written, in write order
    pub images_written: Vec<String>,
    /// Name of the JSON record
    pub record_name: String,
}

/// An image placement after the image-writing step.
#[derive(Debug, Clone)]
struct PlacedImage {
    placement: ImagePlacement,
    filename: String,
    /// Written on this page rather than earlier in the run
    fresh: bool,
}

/// Bookkeeping that lives for one run.
#[derive(Debug, Default)]
struct RunState {
    base: String,
    written: HashMap<ImageId, String>,
    images_written: Vec<String>,
}

/// Extracts one document through a [`PageContentReader`].
///
/// The pipeline owns its reader; the document is released when the
/// pipeline is dropped, whichever way a run ends.
pub struct ExtractionPipeline<R: PageContentReader> {
    reader: R,
    options: ExtractOptions,
    locator: Locator,
}

impl<R: PageContentReader> ExtractionPipeline<R> {
    /// Create a pipeline over a reader.
    pub fn new(reader: R, options: ExtractOptions) -> Self {
        let locator = Locator::new().with_sorted_input(options.assume_sorted_input);
        Self {
            reader,
            options,
            locator,
        }
    }

    /// Get the extraction options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Access the reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Extract the document and write its artifacts.
    ///
    /// Image files are written as pages are processed; the JSON record is
    /// written only after every page succeeded. On failure nothing is rolled
    /// back and no record is written.
    pub fn run<W>(mut self, writer: &mut W, document_name: &str) -> Result<ExtractionReport>
    where
        W: ArtifactWriter + ?Sized,
    {
        let mut state = RunState {
            base: document_base_name(document_name),
            ..RunState::default()
        };
        let pages = self.options.pages.resolve(self.reader.page_count());
        log::info!(
            "Extracting {} ({} of {} pages, {:?}, {})",
            state.base,
            pages.len(),
            self.reader.page_count(),
            self.options.content,
            self.options.granularity
        );

        let record = self.build_record(&pages, &mut state, writer)?;

        let name = record_name(
            &state.base,
            self.options.content,
            self.options.layout,
            self.options.granularity,
        );
        let json = to_json(&record, self.options.json_format)?;
        writer.write(&name, &json)?;
        log::info!("Wrote {} ({} images)", name, state.images_written.len());

        Ok(ExtractionReport {
            document_name: state.base,
            pages: pages.len() as u32,
            images_written: state.images_written,
            record_name: name,
        })
    }

    /// Extract the document record without writing it.
    ///
    /// Image files are still written for modes that reference them.
    pub fn record<W>(&mut self, writer: &mut W, document_name: &str) -> Result<DocumentRecord>
    where
        W: ArtifactWriter + ?Sized,
    {
        let mut state = RunState {
            base: document_base_name(document_name),
            ..RunState::default()
        };
        let pages = self.options.pages.resolve(self.reader.page_count());
        self.build_record(&pages, &mut state, writer)
    }

    /// Write every distinct image of the selected pages once.
    ///
    /// No record is produced. Returns the written names.
    pub fn extract_unique_images<W>(mut self, writer: &mut W, document_name: &str) -> Result<Vec<String>>
    where
        W: ArtifactWriter + ?Sized,
    {
        let mut state = RunState {
            base: document_base_name(document_name),
            ..RunState::default()
        };
        let pages = self.options.pages.resolve(self.reader.page_count());
        log::info!("Extracting unique images of {}", state.base);

        for page in pages {
            self.write_page_images(page, &mut state, writer)?;
        }

        log::info!("Wrote {} unique images", state.images_written.len());
        Ok(state.images_written)
    }

    fn build_record<W>(
        &mut self,
        pages: &[u32],
        state: &mut RunState,
        writer: &mut W,
    ) -> Result<DocumentRecord>
    where
        W: ArtifactWriter + ?Sized,
    {
        let mut records = BTreeMap::new();
        for &page in pages {
            if self.options.dedup == DedupScope::Page {
                state.written.clear();
            }
            let record = self.page_record(page, state, writer)?;
            log::debug!("Page {}: {} items", page, record.len());
            records.insert(page, record);
        }

        Ok(match self.options.layout {
            Layout::Paged => DocumentRecord::paged(records),
            Layout::Flattened => DocumentRecord::flattened(records, self.empty_record()),
        })
    }

    fn page_record<W>(&mut self, page: u32, state: &mut RunState, writer: &mut W) -> Result<PageRecord>
    where
        W: ArtifactWriter + ?Sized,
    {
        let fragments = self
            .reader
            .text_fragments(page, self.options.granularity)
            .map_err(|e| e.on_page(page))?;

        let placed = if self.options.content.writes_images() {
            self.write_page_images(page, state, writer)?
        } else {
            Vec::new()
        };

        let record = match self.options.content {
            ContentMode::TextOnly => PageRecord::Entries(texts(&fragments)),
            ContentMode::ImagesOnly => PageRecord::Images(self.image_records(&fragments, &placed)),
            ContentMode::TextAndImages => {
                let placeholders = placed
                    .into_iter()
                    .map(|p| ImagePlaceholder {
                        filename: p.filename,
                        bbox: p.placement.bbox,
                    })
                    .collect();
                let entries = merge(fragments, placeholders);
                PageRecord::Entries(entries.iter().map(|e| e.as_str().to_string()).collect())
            }
            ContentMode::TextWithImagePositions => PageRecord::TextWithImages {
                images: self.image_records(&fragments, &placed),
                text: texts(&fragments),
            },
        };

        Ok(record)
    }

    /// Write the page's images that were not written earlier in scope.
    ///
    /// Returns every placement of the page with the name it is stored under.
    fn write_page_images<W>(
        &mut self,
        page: u32,
        state: &mut RunState,
        writer: &mut W,
    ) -> Result<Vec<PlacedImage>>
    where
        W: ArtifactWriter + ?Sized,
    {
        let placements = self
            .reader
            .image_placements(page)
            .map_err(|e| e.on_page(page))?;

        let mut placed = Vec::with_capacity(placements.len());
        for (index, placement) in placements.into_iter().enumerate() {
            if let Some(existing) = state.written.get(&placement.id) {
                log::debug!("Image {} already written as {}", placement.id, existing);
                placed.push(PlacedImage {
                    placement,
                    filename: existing.clone(),
                    fresh: false,
                });
                continue;
            }

            let data = self
                .reader
                .image_data(placement.id)
                .map_err(|e| e.on_page(page))?;
            let filename = image_filename(&state.base, page, index + 1, data.extension());
            writer.write(&filename, &data.bytes)?;

            state.written.insert(placement.id, filename.clone());
            state.images_written.push(filename.clone());
            placed.push(PlacedImage {
                placement,
                filename,
                fresh: true,
            });
        }

        Ok(placed)
    }

    /// Neighbor records for the images written on this page.
    fn image_records(&self, fragments: &[TextFragment], placed: &[PlacedImage]) -> Vec<ImageRecord> {
        placed
            .iter()
            .filter(|p| p.fresh)
            .map(|p| {
                let neighbors = self.locator.locate(fragments, &p.placement.bbox);
                ImageRecord::new(p.filename.clone(), p.placement.bbox, neighbors)
            })
            .collect()
    }

    fn empty_record(&self) -> PageRecord {
        match self.options.content {
            ContentMode::TextOnly | ContentMode::TextAndImages => PageRecord::Entries(Vec::new()),
            ContentMode::ImagesOnly => PageRecord::Images(Vec::new()),
            ContentMode::TextWithImagePositions => PageRecord::TextWithImages {
                text: Vec::new(),
                images: Vec::new(),
            },
        }
    }
}

fn texts(fragments: &[TextFragment]) -> Vec<String> {
    fragments.iter().map(|f| f.text.clone()).collect()
}
