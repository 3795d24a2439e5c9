//! Vertical merge of text fragments and image placeholders.

use crate::model::{Entry, ImagePlaceholder, TextFragment};

/// Interleave a page's text fragments and images by ascending top edge.
///
/// Fragments come first in the concatenation, so on equal `y0` a fragment
/// precedes an image and otherwise input order is kept (the sort is stable).
/// Horizontal position is ignored.
pub fn merge(fragments: Vec<TextFragment>, images: Vec<ImagePlaceholder>) -> Vec<Entry> {
    let mut entries: Vec<Entry> = fragments
        .into_iter()
        .map(Entry::Text)
        .chain(images.into_iter().map(Entry::Image))
        .collect();

    entries.sort_by(|a, b| a.bbox().y0.total_cmp(&b.bbox().y0));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn text(label: &str, y0: f32) -> TextFragment {
        TextFragment::new(BoundingBox::new(0.0, y0, 100.0, y0 + 10.0), label).unwrap()
    }

    fn image(name: &str, y0: f32) -> ImagePlaceholder {
        ImagePlaceholder {
            filename: name.to_string(),
            bbox: BoundingBox::new(0.0, y0, 50.0, y0 + 40.0),
        }
    }

    fn labels(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.as_str()).collect()
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_merge_interleaves_by_y0() {
        let merged = merge(
            vec![text("title", 10.0), text("caption", 200.0), text("body", 80.0)],
            vec![image("fig.jpg", 50.0)],
        );
        assert_eq!(merged.len(), 4);
        assert_eq!(labels(&merged), vec!["title", "fig.jpg", "body", "caption"]);
        assert!(merged[1].is_image());
    }

    #[test]
    fn test_merge_is_sorted() {
        let merged = merge(
            vec![text("c", 30.0), text("a", 5.0), text("b", 17.5)],
            vec![image("x.png", 12.0), image("y.png", 40.0)],
        );
        assert!(merged.windows(2).all(|w| w[0].bbox().y0 <= w[1].bbox().y0));
    }

    #[test]
    fn test_merge_stable_on_ties() {
        let merged = merge(
            vec![text("first", 20.0), text("second", 20.0)],
            vec![image("img1.jpg", 20.0), image("img2.jpg", 20.0)],
        );
        assert_eq!(
            labels(&merged),
            vec!["first", "second", "img1.jpg", "img2.jpg"]
        );
    }

    #[test]
    fn test_merge_ignores_columns() {
        let right = TextFragment::new(BoundingBox::new(300.0, 10.0, 500.0, 20.0), "right").unwrap();
        let left = TextFragment::new(BoundingBox::new(0.0, 15.0, 200.0, 25.0), "left").unwrap();
        let merged = merge(vec![left, right], Vec::new());
        assert_eq!(labels(&merged), vec!["right", "left"]);
    }
}
