//! Page content reader abstraction.
//!
//! The extraction pipeline only talks to [`PageContentReader`], which keeps
//! the concrete PDF library (lopdf) out of the ordering and assembly logic
//! and lets tests drive the pipeline with in-memory fakes.

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::Result;
use crate::model::{EmbeddedImage, Granularity, ImageData, ImageId, ImagePlacement, TextFragment};

/// Per-page access to positioned text and images.
///
/// Pages are 1-based. Implementations return [`Error::PageOutOfRange`]
/// for pages outside `1..=page_count()`.
///
/// The underlying document handle is released when the reader is dropped.
///
/// [`Error::PageOutOfRange`]: crate::Error::PageOutOfRange
pub trait PageContentReader {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text fragments of a page in the reader's native order.
    ///
    /// Fragments with no text left after normalization are not returned.
    /// The order is not guaranteed to be top-to-bottom.
    fn text_fragments(&mut self, page: u32, granularity: Granularity) -> Result<Vec<TextFragment>>;

    /// Image placements of a page, one per distinct image.
    ///
    /// When an image is drawn several times on the page only its first
    /// placement is reported.
    fn image_placements(&mut self, page: u32) -> Result<Vec<ImagePlacement>>;

    /// Native encoded bytes of an image resource.
    fn image_data(&mut self, id: ImageId) -> Result<ImageData>;

    /// Placements of a page together with their image data.
    fn images(&mut self, page: u32) -> Result<Vec<EmbeddedImage>> {
        let placements = self.image_placements(page)?;
        let mut images = Vec::with_capacity(placements.len());
        for placement in placements {
            let data = self.image_data(placement.id)?;
            images.push(EmbeddedImage::new(placement, data));
        }
        Ok(images)
    }
}

impl<R: PageContentReader + ?Sized> PageContentReader for Box<R> {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn text_fragments(&mut self, page: u32, granularity: Granularity) -> Result<Vec<TextFragment>> {
        (**self).text_fragments(page, granularity)
    }

    fn image_placements(&mut self, page: u32) -> Result<Vec<ImagePlacement>> {
        (**self).image_placements(page)
    }

    fn image_data(&mut self, id: ImageId) -> Result<ImageData> {
        (**self).image_data(id)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Numeric value of an integer or real object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follow a reference (if any) to a dictionary.
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// Follow a reference (if any) to the object it points at.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}
