//! Text fragments: the unit of text the rest of the crate works with.

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Granularity of text fragments produced by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One fragment per text line; sub-spans concatenated without separator
    #[default]
    Line,
    /// One fragment per paragraph-like block of lines
    Block,
}

impl Granularity {
    /// Suffix used in output artifact names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Granularity::Line => "by_lines",
            Granularity::Block => "by_blocks",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Line => write!(f, "line"),
            Granularity::Block => write!(f, "block"),
        }
    }
}

/// A positioned piece of page text (a line or a block).
///
/// The text is normalized and never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Bounding box of the fragment
    pub bbox: BoundingBox,
    /// Normalized text content
    pub text: String,
}

impl TextFragment {
    /// Build a fragment from raw text, normalizing it first.
    ///
    /// Returns `None` if nothing is left after normalization.
    pub fn new(bbox: BoundingBox, raw: &str) -> Option<Self> {
        let text = normalize_text(raw);
        if text.is_empty() {
            return None;
        }
        Some(Self { bbox, text })
    }
}

/// Replace tabs and newlines with single spaces, then trim.
pub fn normalize_text(raw: &str) -> String {
    raw.replace(['\t', '\n'], " ").trim().to_string()
}
