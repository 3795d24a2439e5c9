//! Nearest text above and below an image.

use crate::model::{BoundingBox, ImageNeighbors, TextFragment};

/// Finds the text neighbors of images on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    /// Trust the input to be in top-to-bottom order.
    ///
    /// When `false`, units are sorted by `y0` before scanning so that the
    /// result is the geometric nearest neighbor regardless of input order.
    pub assume_sorted_input: bool,
}

impl Locator {
    /// Create a locator that scans units in their given order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the input is trusted to be sorted.
    pub fn with_sorted_input(mut self, assume_sorted: bool) -> Self {
        self.assume_sorted_input = assume_sorted;
        self
    }

    /// Locate the neighbors of `image` among `units`.
    ///
    /// `overlapping_index` always refers to the position in `units`.
    pub fn locate(&self, units: &[TextFragment], image: &BoundingBox) -> ImageNeighbors {
        if self.assume_sorted_input {
            return scan(units.iter().enumerate(), image);
        }

        let mut indexed: Vec<(usize, &TextFragment)> = units.iter().enumerate().collect();
        indexed.sort_by(|(_, a), (_, b)| a.bbox.y0.total_cmp(&b.bbox.y0));
        scan(indexed.into_iter(), image)
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            assume_sorted_input: true,
        }
    }
}

/// Locate with the default locator (input order trusted).
pub fn locate(units: &[TextFragment], image: &BoundingBox) -> ImageNeighbors {
    Locator::default().locate(units, image)
}

/// Single pass over the units.
///
/// Above-matches keep overwriting `preceding`, so the last one seen wins.
/// The first below-match sets `following` and ends the scan.
fn scan<'a, I>(units: I, image: &BoundingBox) -> ImageNeighbors
where
    I: Iterator<Item = (usize, &'a TextFragment)>,
{
    let mut neighbors = ImageNeighbors::default();

    for (index, unit) in units {
        if unit.bbox.intersects(image) {
            neighbors.overlapping_index = Some(index);
        }
        if unit.bbox.is_above(image) {
            neighbors.preceding = unit.text.clone();
        } else if unit.bbox.is_below(image) {
            neighbors.following = unit.text.clone();
            break;
        }
    }

    neighbors
}
