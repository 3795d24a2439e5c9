//! lopdf-backed page content reader.

use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::read_header;
use crate::error::{Error, Result};
use crate::model::{detect_format, Granularity, ImageData, ImageId, ImagePlacement, TextFragment};

use super::backend::{get_number, resolve, resolve_dict, PageContentReader};
use super::content::{ContentInterpreter, PageContent, PageFrame};
use super::layout;

/// `/Parent` chains longer than this are treated as cyclic.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Reads positioned text and images from a PDF with lopdf.
///
/// The most recently interpreted page is cached, so asking for a page's
/// fragments and then its images interprets its content only once.
pub struct LopdfReader {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    cache: Option<(u32, PageContent)>,
}

impl LopdfReader {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| open_error(path, e.to_string()))?;
        Self::load(&data, path)
    }

    /// Read a PDF from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::load(data, Path::new(""))
    }

    fn load(data: &[u8], path: &Path) -> Result<Self> {
        let header = read_header(data)?;
        log::debug!("Loading {} ({} bytes)", header, data.len());

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            other => open_error(path, other.to_string()),
        })?;

        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }

        let pages = doc.get_pages();
        log::debug!("Document has {} pages", pages.len());

        Ok(Self {
            doc,
            pages,
            cache: None,
        })
    }

    /// PDF version from the file header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Interpret a page, reusing the cached result when possible.
    fn page_content(&mut self, page: u32) -> Result<&PageContent> {
        let cached = matches!(&self.cache, Some((p, _)) if *p == page);
        if !cached {
            let content = self.interpret_page(page)?;
            self.cache = Some((page, content));
        }
        match &self.cache {
            Some((_, content)) => Ok(content),
            None => Err(Error::PdfParse(format!("page {} not interpreted", page))),
        }
    }

    fn interpret_page(&self, page: u32) -> Result<PageContent> {
        let page_id = self.page_id(page)?;
        let page_dict = self.doc.get_dictionary(page_id)?;

        let frame = self.page_frame(page_dict);
        let resources = self
            .inherited(page_dict, b"Resources")
            .and_then(|r| resolve_dict(&self.doc, r));
        let content = self.content_bytes(page_dict)?;

        let result = ContentInterpreter::new(&self.doc, frame).interpret(&content, resources)?;
        log::debug!(
            "Page {}: {} spans, {} image placements",
            page,
            result.spans.len(),
            result.images.len()
        );
        Ok(result)
    }

    /// Look up a page attribute, walking `/Parent` for inheritable keys.
    fn inherited<'a>(&'a self, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page_dict;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            dict = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| resolve_dict(&self.doc, p))?;
        }
        None
    }

    fn page_frame(&self, page_dict: &Dictionary) -> PageFrame {
        let media_box = self
            .inherited(page_dict, b"MediaBox")
            .map(|mb| resolve(&self.doc, mb))
            .and_then(|mb| mb.as_array().ok())
            .filter(|arr| arr.len() >= 4)
            .and_then(|arr| {
                Some((
                    get_number(&arr[0])?,
                    get_number(&arr[1])?,
                    get_number(&arr[2])?,
                    get_number(&arr[3])?,
                ))
            });

        match media_box {
            Some((llx, lly, urx, ury)) => PageFrame::from_media_box(llx, lly, urx, ury),
            None => {
                log::debug!("No MediaBox, assuming Letter");
                PageFrame::letter()
            }
        }
    }

    fn content_bytes(&self, page_dict: &Dictionary) -> Result<Vec<u8>> {
        let Ok(contents) = page_dict.get(b"Contents") else {
            // A page without content is blank, not broken.
            return Ok(Vec::new());
        };

        match resolve(&self.doc, contents) {
            Object::Stream(s) => stream_content(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = resolve(&self.doc, obj) {
                        content.extend_from_slice(&stream_content(s)?);
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn image_stream(&self, id: ImageId) -> Result<&Stream> {
        let object_id: ObjectId = (id.object, id.generation);
        match self.doc.get_object(object_id) {
            Ok(Object::Stream(stream)) => {
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .ok()
                    .and_then(|s| s.as_name().ok())
                    .map(|n| n == b"Image")
                    .unwrap_or(false);
                if is_image {
                    Ok(stream)
                } else {
                    Err(Error::ImageExtract(format!("{} is not an image XObject", id)))
                }
            }
            Ok(_) => Err(Error::ImageExtract(format!("{} is not a stream", id))),
            Err(e) => Err(Error::ImageExtract(format!("{}: {}", id, e))),
        }
    }

    /// Number of color components of an image's color space.
    fn color_components(&self, dict: &Dictionary) -> Option<u32> {
        let cs = resolve(&self.doc, dict.get(b"ColorSpace").ok()?);
        match cs {
            Object::Name(name) => match name.as_slice() {
                b"DeviceRGB" | b"CalRGB" => Some(3),
                b"DeviceGray" | b"CalGray" => Some(1),
                _ => None,
            },
            Object::Array(arr) => {
                let family = arr.first()?.as_name().ok()?;
                match family {
                    b"ICCBased" => {
                        let Object::Stream(profile) = resolve(&self.doc, arr.get(1)?) else {
                            return None;
                        };
                        profile
                            .dict
                            .get(b"N")
                            .ok()
                            .and_then(get_number)
                            .map(|n| n as u32)
                            .filter(|n| *n == 1 || *n == 3)
                    }
                    b"CalRGB" => Some(3),
                    b"CalGray" => Some(1),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl PageContentReader for LopdfReader {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_fragments(&mut self, page: u32, granularity: Granularity) -> Result<Vec<TextFragment>> {
        let spans = self.page_content(page)?.spans.clone();
        Ok(layout::fragments(spans, granularity))
    }

    fn image_placements(&mut self, page: u32) -> Result<Vec<ImagePlacement>> {
        let placements = &self.page_content(page)?.images;
        let mut seen = HashSet::new();
        Ok(placements
            .iter()
            .filter(|p| seen.insert(p.id))
            .copied()
            .collect())
    }

    fn image_data(&mut self, id: ImageId) -> Result<ImageData> {
        let stream = self.image_stream(id)?;
        let filters = stream_filters(&stream.dict);

        let encoded_format = filters.last().and_then(|f| match f.as_slice() {
            b"DCTDecode" => Some("jpg"),
            b"JPXDecode" => Some("jp2"),
            b"JBIG2Decode" => Some("jb2"),
            b"CCITTFaxDecode" => Some("ccitt"),
            _ => None,
        });

        if let Some(format) = encoded_format {
            if filters.len() == 1 {
                return Ok(ImageData::new(stream.content.clone(), format));
            }
            // Outer filters lopdf can undo may leave a complete image file.
            if let Ok(inner) = stream.decompressed_content() {
                if detect_format(&inner).is_some() {
                    return Ok(ImageData::detect(inner));
                }
            }
            log::warn!("Image {} has chained filters, writing stored bytes", id);
            return Ok(ImageData::new(stream.content.clone(), "raw"));
        }

        let samples = if filters.is_empty() {
            stream.content.clone()
        } else {
            stream
                .decompressed_content()
                .map_err(|e| Error::ImageExtract(format!("{}: {}", id, e)))?
        };

        let dict = &stream.dict;
        let width = dict.get(b"Width").ok().and_then(get_number).map(|n| n as u32);
        let height = dict.get(b"Height").ok().and_then(get_number).map(|n| n as u32);
        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(get_number)
            .map(|n| n as u32);
        let components = self.color_components(dict);

        match (width, height, bits, components) {
            (Some(w), Some(h), Some(8), Some(c)) => match wrap_png(&samples, w, h, c)? {
                Some(png) => Ok(ImageData::new(png, "png")),
                None => Ok(ImageData::detect(samples)),
            },
            _ => Ok(ImageData::detect(samples)),
        }
    }
}

fn open_error(path: &Path, reason: String) -> Error {
    Error::DocumentOpen {
        path: PathBuf::from(path),
        reason,
    }
}

fn stream_content(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| Error::PdfParse(e.to_string()))
    } else {
        Ok(stream.content.clone())
    }
}

/// Filter names of a stream, outermost first.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Encode 8-bit gray or RGB samples as PNG.
///
/// Returns `None` if the samples do not fill the declared size.
fn wrap_png(samples: &[u8], width: u32, height: u32, components: u32) -> Result<Option<Vec<u8>>> {
    let needed = width as usize * height as usize * components as usize;
    if needed == 0 || samples.len() < needed {
        return Ok(None);
    }
    let pixels = samples[..needed].to_vec();

    let img = match components {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        _ => None,
    };
    let Some(img) = img else {
        return Ok(None);
    };

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(Some(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_non_pdf() {
        let err = LopdfReader::from_bytes(b"hello world").err().unwrap();
        assert!(matches!(err, Error::UnknownFormat));
    }

    #[test]
    fn test_from_bytes_rejects_malformed_version() {
        let err = LopdfReader::from_bytes(b"%PDF-x.y\n1 0 obj").err().unwrap();
        assert!(matches!(err, Error::UnsupportedVersion(v) if v == "x.y"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = LopdfReader::open("/nonexistent/input.pdf").err().unwrap();
        match err {
            Error::DocumentOpen { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/input.pdf"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stream_filters() {
        let mut dict = Dictionary::new();
        assert!(stream_filters(&dict).is_empty());
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        assert_eq!(stream_filters(&dict), vec![b"DCTDecode".to_vec()]);
        dict.set(
            "Filter",
            Object::Array(vec![
                Object::Name(b"FlateDecode".to_vec()),
                Object::Name(b"DCTDecode".to_vec()),
            ]),
        );
        assert_eq!(stream_filters(&dict).len(), 2);
    }

    #[test]
    fn test_wrap_png_gray() {
        let png = wrap_png(&[0, 128, 255, 64], 2, 2, 1).unwrap().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_wrap_png_short_samples() {
        assert!(wrap_png(&[1, 2, 3], 2, 2, 3).unwrap().is_none());
    }
}
