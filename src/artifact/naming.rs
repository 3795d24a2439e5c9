//! Deterministic artifact names.
//!
//! Every name is derived from the document's base name: its file name with
//! everything from the first `.` removed (`report.v2.pdf` becomes `report`).

use std::path::Path;

use crate::extract::{ContentMode, Layout};
use crate::model::Granularity;

/// Base name of a document path.
pub fn document_base_name<P: AsRef<Path>>(path: P) -> String {
    let file_name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => file_name,
    }
}

/// Name of the JSON record for a mode, layout and granularity.
pub fn record_name(base: &str, content: ContentMode, layout: Layout, granularity: Granularity) -> String {
    let stem = match (content, layout) {
        (ContentMode::TextOnly, Layout::Paged) => "pages",
        (ContentMode::TextOnly, Layout::Flattened) => "text",
        (ContentMode::ImagesOnly, Layout::Paged) => "image_data",
        (ContentMode::ImagesOnly, Layout::Flattened) => "image_data_flat",
        (ContentMode::TextAndImages, Layout::Paged) => "content",
        (ContentMode::TextAndImages, Layout::Flattened) => "content_flat",
        (ContentMode::TextWithImagePositions, Layout::Paged) => "layout",
        (ContentMode::TextWithImagePositions, Layout::Flattened) => "layout_flat",
    };
    format!("{}_{}_{}.json", base, stem, granularity.suffix())
}

/// Name of an extracted image: `{base}_page{n}_img{k}.{ext}`.
pub fn image_filename(base: &str, page: u32, index: usize, extension: &str) -> String {
    format!("{}_page{}_img{}.{}", base, page, index, extension)
}

/// Name of a rasterized page: `{base}_page_{n}.jpg`.
pub fn page_image_filename(base: &str, page: u32) -> String {
    format!("{}_page_{}.jpg", base, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_cuts_at_first_dot() {
        assert_eq!(document_base_name("report.v2.pdf"), "report");
        assert_eq!(document_base_name("/tmp/in/paper.pdf"), "paper");
        assert_eq!(document_base_name("noext"), "noext");
        assert_eq!(document_base_name(""), "");
    }

    #[test]
    fn test_record_names() {
        let line = Granularity::Line;
        let block = Granularity::Block;
        assert_eq!(
            record_name("doc", ContentMode::TextOnly, Layout::Paged, line),
            "doc_pages_by_lines.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::TextOnly, Layout::Flattened, block),
            "doc_text_by_blocks.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::ImagesOnly, Layout::Paged, line),
            "doc_image_data_by_lines.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::ImagesOnly, Layout::Flattened, line),
            "doc_image_data_flat_by_lines.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::TextAndImages, Layout::Paged, block),
            "doc_content_by_blocks.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::TextAndImages, Layout::Flattened, line),
            "doc_content_flat_by_lines.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::TextWithImagePositions, Layout::Paged, line),
            "doc_layout_by_lines.json"
        );
        assert_eq!(
            record_name("doc", ContentMode::TextWithImagePositions, Layout::Flattened, block),
            "doc_layout_flat_by_blocks.json"
        );
    }

    #[test]
    fn test_image_names() {
        assert_eq!(image_filename("doc", 2, 1, "jpg"), "doc_page2_img1.jpg");
        assert_eq!(page_image_filename("doc", 10), "doc_page_10.jpg");
    }
}
