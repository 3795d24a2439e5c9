//! Data model for positional page content.
//!
//! Geometry, text fragments, embedded images and the page/document records
//! that the extraction pipeline assembles and serializes.

mod embedded;
mod fragment;
mod geometry;
mod record;

pub use embedded::{detect_format, EmbeddedImage, ImageData, ImageId, ImagePlacement};
pub use fragment::{normalize_text, Granularity, TextFragment};
pub use geometry::BoundingBox;
pub use record::{
    DocumentRecord, Entry, ImageNeighbors, ImagePlaceholder, ImageRecord, PageRecord,
};
