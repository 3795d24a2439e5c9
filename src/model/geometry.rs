//! Axis-aligned bounding boxes in top-down page space.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle on a page.
///
/// Coordinates are in PDF points with the origin at the top-left corner of
/// the page and `y` growing downward. `x0 <= x1` and `y0 <= y1` always hold.
///
/// Serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a box from two opposite corners, in any order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing all the given points.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut bbox = Self {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
        };
        for (x, y) in iter {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        Some(bbox)
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Whether the two boxes share at least one point.
    ///
    /// Edges are inclusive: boxes that only touch count as intersecting.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Whether this box lies entirely above `other`.
    pub fn is_above(&self, other: &BoundingBox) -> bool {
        self.y1 <= other.y0
    }

    /// Whether this box lies entirely below `other`.
    pub fn is_below(&self, other: &BoundingBox) -> bool {
        self.y0 >= other.y1
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// The box as `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(a: [f32; 4]) -> Self {
        BoundingBox::new(a[0], a[1], a[2], a[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let b = BoundingBox::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b.to_array(), [0.0, 5.0, 10.0, 20.0]);
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 15.0);
    }

    #[test]
    fn test_vertical_predicates() {
        let top = BoundingBox::new(0.0, 0.0, 100.0, 10.0);
        let bottom = BoundingBox::new(0.0, 10.0, 100.0, 20.0);
        assert!(top.is_above(&bottom));
        assert!(bottom.is_below(&top));
        assert!(!bottom.is_above(&top));
        assert!(!top.is_below(&bottom));
    }

    #[test]
    fn test_intersects_inclusive_edges() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let touching = BoundingBox::new(0.0, 10.0, 10.0, 20.0);
        let apart = BoundingBox::new(0.0, 10.5, 10.0, 20.0);
        let side = BoundingBox::new(11.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
        assert!(!a.intersects(&side));
    }

    #[test]
    fn test_union_and_points() {
        let a = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        let b = BoundingBox::new(3.0, -2.0, 8.0, 4.0);
        assert_eq!(a.union(&b).to_array(), [0.0, -2.0, 8.0, 5.0]);

        let p = BoundingBox::from_points([(1.0, 4.0), (3.0, 2.0), (2.0, 9.0)]).unwrap();
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0, 9.0]);
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let b = BoundingBox::new(1.5, 2.0, 3.0, 4.25);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.5,2.0,3.0,4.25]");
        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
