//! Document extraction: options, the per-page pipeline and rasterization.

mod options;
mod pipeline;
mod rasterize;

pub use options::{
    ContentMode, DedupScope, ExtractOptions, Layout, PageSelection, DEFAULT_JPEG_QUALITY,
};
pub use pipeline::{ExtractionPipeline, ExtractionReport};
pub use rasterize::{encode_jpeg, rasterize_pages, PageRasterizer};
