//! Embedded image types.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Identity of an embedded image resource within one document.
///
/// Two placements with the same identity show the same image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId {
    /// Object number
    pub object: u32,
    /// Generation number
    pub generation: u16,
}

impl ImageId {
    /// Create a new image identity.
    pub fn new(object: u32, generation: u16) -> Self {
        Self { object, generation }
    }
}

impl From<lopdf::ObjectId> for ImageId {
    fn from((object, generation): lopdf::ObjectId) -> Self {
        Self { object, generation }
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.object, self.generation)
    }
}

/// One positioned use of an image on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Identity of the image resource
    pub id: ImageId,
    /// Where the image is drawn
    pub bbox: BoundingBox,
}

/// Encoded bytes of an image resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Bytes in the resource's native encoding
    pub bytes: Vec<u8>,
    /// Format name, also used as the file extension (e.g. "jpg", "png")
    pub format: String,
}

impl ImageData {
    /// Create image data with an explicit format.
    pub fn new(bytes: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            bytes,
            format: format.into(),
        }
    }

    /// Create image data, detecting the format from magic bytes.
    ///
    /// Falls back to `"raw"` when the bytes are not a known image container.
    pub fn detect(bytes: Vec<u8>) -> Self {
        let format = detect_format(&bytes).unwrap_or("raw");
        Self::new(bytes, format)
    }

    /// File extension for this image.
    pub fn extension(&self) -> &str {
        &self.format
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// An image placement together with its data.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// Identity of the image resource
    pub id: ImageId,
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Format / file extension
    pub format: String,
    /// Where the image is drawn
    pub bbox: BoundingBox,
}

impl EmbeddedImage {
    /// Combine a placement with its data.
    pub fn new(placement: ImagePlacement, data: ImageData) -> Self {
        Self {
            id: placement.id,
            bytes: data.bytes,
            format: data.format,
            bbox: placement.bbox,
        }
    }
}

/// Detect an image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // TIFF, little- or big-endian
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("tiff");
    }

    // JPEG 2000 codestream or JP2 container
    if data.starts_with(&[0xFF, 0x4F, 0xFF, 0x51])
        || data.starts_with(&[0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20])
    {
        return Some("jp2");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), Some("jpg"));
        assert_eq!(
            detect_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("png")
        );
        assert_eq!(detect_format(&[0x00, 0x00, 0x00, 0x00]), None);
        assert_eq!(detect_format(&[0xFF]), None);
    }

    #[test]
    fn test_image_data_detect_fallback() {
        let data = ImageData::detect(vec![1, 2, 3, 4, 5]);
        assert_eq!(data.extension(), "raw");
        assert_eq!(data.size(), 5);
    }

    #[test]
    fn test_image_id_from_object_id() {
        let id: ImageId = (12, 0).into();
        assert_eq!(id, ImageId::new(12, 0));
        assert_eq!(id.to_string(), "12 0 R");
    }
}
