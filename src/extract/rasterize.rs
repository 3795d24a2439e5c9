//! Page rasterization to JPEG files.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::artifact::naming::{document_base_name, page_image_filename};
use crate::artifact::ArtifactWriter;
use crate::error::{Error, Result};

/// Renders whole pages to bitmaps.
///
/// No renderer is bundled; implement this over a rendering library to use
/// [`rasterize_pages`].
pub trait PageRasterizer {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Render a 1-based page.
    fn rasterize(&mut self, page: u32) -> Result<DynamicImage>;
}

/// Rasterize every page and write it as `{base}_page_{n}.jpg`.
///
/// Returns the written names in page order. Stops at the first failure;
/// pages written before it are kept.
pub fn rasterize_pages<P, W>(
    rasterizer: &mut P,
    writer: &mut W,
    document_name: &str,
    quality: u8,
) -> Result<Vec<String>>
where
    P: PageRasterizer + ?Sized,
    W: ArtifactWriter + ?Sized,
{
    let base = document_base_name(document_name);
    let quality = quality.clamp(1, 100);
    let page_count = rasterizer.page_count();
    log::info!("Rasterizing {} pages of {}", page_count, base);

    let mut written = Vec::with_capacity(page_count as usize);
    for page in 1..=page_count {
        let bitmap = rasterizer.rasterize(page).map_err(|e| match e {
            Error::Rasterize { .. } => e,
            other => Error::Rasterize {
                page,
                reason: other.to_string(),
            },
        })?;

        let jpeg = encode_jpeg(&bitmap, quality)?;
        let name = page_image_filename(&base, page);
        writer.write(&name, &jpeg)?;
        written.push(name);
    }

    Ok(written)
}

/// Encode a bitmap as JPEG with the given quality (1-100).
pub fn encode_jpeg(bitmap: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = bitmap.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::MemoryArtifactWriter;
    use image::RgbImage;

    struct SolidPages {
        pages: u32,
        fail_on: Option<u32>,
    }

    impl PageRasterizer for SolidPages {
        fn page_count(&self) -> u32 {
            self.pages
        }

        fn rasterize(&mut self, page: u32) -> Result<DynamicImage> {
            if Some(page) == self.fail_on {
                return Err(Error::PdfParse("broken page".to_string()));
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                8,
                8,
                image::Rgb([200, 10, 10]),
            )))
        }
    }

    #[test]
    fn test_rasterize_names_pages() {
        let mut rasterizer = SolidPages {
            pages: 2,
            fail_on: None,
        };
        let mut writer = MemoryArtifactWriter::new();
        let names = rasterize_pages(&mut rasterizer, &mut writer, "scan.pdf", 75).unwrap();
        assert_eq!(names, vec!["scan_page_1.jpg", "scan_page_2.jpg"]);

        let jpeg = writer.get("scan_page_1.jpg").unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_rasterize_failure_names_page() {
        let mut rasterizer = SolidPages {
            pages: 3,
            fail_on: Some(2),
        };
        let mut writer = MemoryArtifactWriter::new();
        let err = rasterize_pages(&mut rasterizer, &mut writer, "scan.pdf", 75).unwrap_err();
        assert!(matches!(err, Error::Rasterize { page: 2, .. }));
        // page 1 stays written
        assert_eq!(writer.len(), 1);
    }
}
