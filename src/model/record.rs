//! Page and document records: what the pipeline produces and serializes.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::{BoundingBox, TextFragment};

/// An image standing in a reading-order sequence, by output filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlaceholder {
    /// File name the image was written under
    pub filename: String,
    /// Where the image is drawn
    pub bbox: BoundingBox,
}

/// One element of a merged reading-order sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A text fragment
    Text(TextFragment),
    /// An image placeholder
    Image(ImagePlaceholder),
}

impl Entry {
    /// Bounding box of the entry.
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            Entry::Text(fragment) => &fragment.bbox,
            Entry::Image(placeholder) => &placeholder.bbox,
        }
    }

    /// The string this entry contributes to output: text or filename.
    pub fn as_str(&self) -> &str {
        match self {
            Entry::Text(fragment) => &fragment.text,
            Entry::Image(placeholder) => &placeholder.filename,
        }
    }

    /// Check if this entry is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Entry::Image(_))
    }
}

/// Text neighbors of one image on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNeighbors {
    /// Text of the closest unit above the image (empty if none)
    pub preceding: String,
    /// Text of the first unit below the image (empty if none)
    pub following: String,
    /// Index of a text unit intersecting the image, in input order
    pub overlapping_index: Option<usize>,
}

/// Serialized metadata of one extracted image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Output file name
    pub filename: String,
    /// `[x0, y0, x1, y1]`
    pub bbox: BoundingBox,
    /// Text immediately above
    pub preceding_text: String,
    /// Text immediately below
    pub following_text: String,
    /// Index of an overlapping text unit, or -1
    pub block_number: i64,
}

impl ImageRecord {
    /// Build a record from an image's filename, box and neighbors.
    pub fn new(filename: impl Into<String>, bbox: BoundingBox, neighbors: ImageNeighbors) -> Self {
        Self {
            filename: filename.into(),
            bbox,
            preceding_text: neighbors.preceding,
            following_text: neighbors.following,
            block_number: neighbors.overlapping_index.map_or(-1, |i| i as i64),
        }
    }
}

/// Extracted content of one page.
///
/// The shape depends on the extraction mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRecord {
    /// Ordered strings: fragment texts, possibly interleaved with image filenames
    Entries(Vec<String>),
    /// Image metadata
    Images(Vec<ImageRecord>),
    /// Full text plus image metadata
    TextWithImages {
        /// Fragment texts in reader order
        text: Vec<String>,
        /// Image metadata
        images: Vec<ImageRecord>,
    },
}

impl PageRecord {
    /// Number of top-level items in the record.
    pub fn len(&self) -> usize {
        match self {
            PageRecord::Entries(v) => v.len(),
            PageRecord::Images(v) => v.len(),
            PageRecord::TextWithImages { text, images } => text.len() + images.len(),
        }
    }

    /// Check if the record holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append another page's record to this one, in order.
    ///
    /// Records of different shapes combine into `TextWithImages`.
    pub fn append(&mut self, other: PageRecord) {
        let current = std::mem::replace(self, PageRecord::Entries(Vec::new()));
        *self = match (current, other) {
            (PageRecord::Entries(mut a), PageRecord::Entries(b)) => {
                a.extend(b);
                PageRecord::Entries(a)
            }
            (PageRecord::Images(mut a), PageRecord::Images(b)) => {
                a.extend(b);
                PageRecord::Images(a)
            }
            (current, other) => {
                let (mut text, mut images) = current.into_parts();
                let (more_text, more_images) = other.into_parts();
                text.extend(more_text);
                images.extend(more_images);
                PageRecord::TextWithImages { text, images }
            }
        };
    }

    fn into_parts(self) -> (Vec<String>, Vec<ImageRecord>) {
        match self {
            PageRecord::Entries(text) => (text, Vec::new()),
            PageRecord::Images(images) => (Vec::new(), images),
            PageRecord::TextWithImages { text, images } => (text, images),
        }
    }
}

/// Extracted content of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentRecord {
    /// One record per 1-based page number, ascending
    Paged(BTreeMap<u32, PageRecord>),
    /// All pages concatenated in page order
    Flattened(PageRecord),
}

/// Untagged content buffers map keys as strings, so page numbers are parsed here.
///
/// An empty list carries no shape and reads back as `PageRecord::Entries`,
/// including an empty images-only record.
impl<'de> Deserialize<'de> for DocumentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flattened(PageRecord),
            Paged(BTreeMap<String, PageRecord>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flattened(record) => Ok(DocumentRecord::Flattened(record)),
            Repr::Paged(pages) => pages
                .into_iter()
                .map(|(key, record)| {
                    key.parse::<u32>()
                        .map(|page| (page, record))
                        .map_err(|_| <D::Error as de::Error>::custom(format!("invalid page number: {}", key)))
                })
                .collect::<std::result::Result<_, _>>()
                .map(DocumentRecord::Paged),
        }
    }
}

impl DocumentRecord {
    /// Assemble page records into a paged document record.
    pub fn paged(pages: BTreeMap<u32, PageRecord>) -> Self {
        DocumentRecord::Paged(pages)
    }

    /// Concatenate page records in page order.
    ///
    /// `empty` provides the shape used when there are no pages.
    pub fn flattened(pages: BTreeMap<u32, PageRecord>, empty: PageRecord) -> Self {
        let mut iter = pages.into_values();
        let mut acc = match iter.next() {
            Some(first) => first,
            None => empty,
        };
        for page in iter {
            acc.append(page);
        }
        DocumentRecord::Flattened(acc)
    }

    /// Number of pages represented, or 0 for a flattened record.
    pub fn page_count(&self) -> usize {
        match self {
            DocumentRecord::Paged(pages) => pages.len(),
            DocumentRecord::Flattened(_) => 0,
        }
    }

    /// Get a page record by 1-based number.
    pub fn page(&self, number: u32) -> Option<&PageRecord> {
        match self {
            DocumentRecord::Paged(pages) => pages.get(&number),
            DocumentRecord::Flattened(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, block: Option<usize>) -> ImageRecord {
        ImageRecord::new(
            name,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            ImageNeighbors {
                preceding: "above".to_string(),
                following: String::new(),
                overlapping_index: block,
            },
        )
    }

    #[test]
    fn test_image_record_block_number() {
        assert_eq!(record("a.png", None).block_number, -1);
        assert_eq!(record("a.png", Some(4)).block_number, 4);
    }

    #[test]
    fn test_image_record_json_shape() {
        let json = serde_json::to_value(record("doc_page1_img1.jpg", Some(0))).unwrap();
        assert_eq!(json["filename"], "doc_page1_img1.jpg");
        assert_eq!(json["bbox"], serde_json::json!([0.0, 0.0, 1.0, 1.0]));
        assert_eq!(json["preceding_text"], "above");
        assert_eq!(json["following_text"], "");
        assert_eq!(json["block_number"], 0);
    }

    #[test]
    fn test_append_same_shape() {
        let mut a = PageRecord::Entries(vec!["a".into()]);
        a.append(PageRecord::Entries(vec!["b".into(), "c".into()]));
        assert_eq!(a, PageRecord::Entries(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn test_append_mixed_shapes() {
        let mut a = PageRecord::Entries(vec!["a".into()]);
        a.append(PageRecord::Images(vec![record("x.jpg", None)]));
        match a {
            PageRecord::TextWithImages { text, images } => {
                assert_eq!(text, vec!["a".to_string()]);
                assert_eq!(images.len(), 1);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_flattened_keeps_page_order() {
        let mut pages = BTreeMap::new();
        pages.insert(2, PageRecord::Entries(vec!["two".into()]));
        pages.insert(1, PageRecord::Entries(vec!["one".into()]));
        pages.insert(10, PageRecord::Entries(vec!["ten".into()]));

        let doc = DocumentRecord::flattened(pages, PageRecord::Entries(Vec::new()));
        assert_eq!(
            doc,
            DocumentRecord::Flattened(PageRecord::Entries(vec![
                "one".into(),
                "two".into(),
                "ten".into()
            ]))
        );
    }

    #[test]
    fn test_paged_serializes_ascending_keys() {
        let mut pages = BTreeMap::new();
        pages.insert(10, PageRecord::Entries(vec!["ten".into()]));
        pages.insert(2, PageRecord::Entries(vec!["two".into()]));
        let json = serde_json::to_string(&DocumentRecord::paged(pages)).unwrap();
        assert_eq!(json, r#"{"2":["two"],"10":["ten"]}"#);
    }

    #[test]
    fn test_paged_deserializes_page_numbers() {
        let doc: DocumentRecord =
            serde_json::from_str(r#"{"2":["two"],"10":{"text":["ten"],"images":[]}}"#).unwrap();
        assert_eq!(doc.page(2), Some(&PageRecord::Entries(vec!["two".into()])));
        assert_eq!(
            doc.page(10),
            Some(&PageRecord::TextWithImages {
                text: vec!["ten".into()],
                images: Vec::new()
            })
        );
    }

    #[test]
    fn test_flattened_deserializes_text_with_images() {
        let doc: DocumentRecord = serde_json::from_str(r#"{"text":["a"],"images":[]}"#).unwrap();
        assert_eq!(
            doc,
            DocumentRecord::Flattened(PageRecord::TextWithImages {
                text: vec!["a".into()],
                images: Vec::new()
            })
        );
    }

    #[test]
    fn test_empty_list_reads_back_as_entries() {
        let json = serde_json::to_string(&DocumentRecord::Flattened(PageRecord::Images(Vec::new()))).unwrap();
        assert_eq!(json, "[]");
        let doc: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, DocumentRecord::Flattened(PageRecord::Entries(Vec::new())));
        assert!(matches!(doc, DocumentRecord::Flattened(ref r) if r.is_empty()));
    }

    #[test]
    fn test_paged_rejects_non_numeric_key() {
        assert!(serde_json::from_str::<DocumentRecord>(r#"{"one":["a"]}"#).is_err());
    }
}
