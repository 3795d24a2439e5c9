//! Grouping of positioned spans into lines and blocks.

use std::cmp::Ordering;

use crate::model::{BoundingBox, Granularity, TextFragment};

use super::content::PositionedSpan;

/// Spans whose baselines differ by less than this fraction of the font
/// size share a line.
const LINE_TOLERANCE: f32 = 0.3;

/// A horizontal gap wider than this many font sizes splits a line
/// (side-by-side columns on a shared baseline).
const COLUMN_GAP: f32 = 3.0;

/// Line spacing above this multiple of the page average starts a block.
const BLOCK_SPACING_FACTOR: f32 = 1.5;

/// Font size change (points) that starts a block.
const BLOCK_FONT_DELTA: f32 = 1.0;

/// Left margin change (points) that starts a block.
const BLOCK_INDENT_DELTA: f32 = 20.0;

/// Used when a page has fewer than two distinct baselines.
const DEFAULT_LINE_SPACING: f32 = 12.0;

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub(crate) struct TextLine {
    pub spans: Vec<PositionedSpan>,
    pub bbox: BoundingBox,
    pub baseline: f32,
    pub font_size: f32,
}

impl TextLine {
    fn from_spans(mut spans: Vec<PositionedSpan>) -> Option<Self> {
        // Baselines within tolerance may be out of reading order.
        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let first = spans.first()?;
        let bbox = spans
            .iter()
            .skip(1)
            .fold(first.bbox, |acc, s| acc.union(&s.bbox));
        let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);
        Some(Self {
            baseline: first.baseline,
            bbox,
            font_size,
            spans,
        })
    }

    /// Span texts concatenated without separator.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn left(&self) -> f32 {
        self.bbox.x0
    }
}

/// Consecutive lines forming a paragraph-like unit.
#[derive(Debug, Clone)]
pub(crate) struct TextBlock {
    pub lines: Vec<TextLine>,
    pub bbox: BoundingBox,
}

impl TextBlock {
    fn from_lines(lines: Vec<TextLine>) -> Option<Self> {
        let first = lines.first()?;
        let bbox = lines
            .iter()
            .skip(1)
            .fold(first.bbox, |acc, l| acc.union(&l.bbox));
        Some(Self { lines, bbox })
    }

    /// Line texts joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Turn a page's spans into text fragments at the given granularity.
///
/// Fragments whose text is empty after normalization are dropped.
pub(crate) fn fragments(spans: Vec<PositionedSpan>, granularity: Granularity) -> Vec<TextFragment> {
    let lines = group_lines(spans);
    match granularity {
        Granularity::Line => lines
            .iter()
            .filter_map(|line| TextFragment::new(line.bbox, &line.text()))
            .collect(),
        Granularity::Block => group_blocks(lines)
            .iter()
            .filter_map(|block| TextFragment::new(block.bbox, &block.text()))
            .collect(),
    }
}

/// Group spans into lines, top to bottom and left to right.
pub(crate) fn group_lines(mut spans: Vec<PositionedSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| match a.baseline.total_cmp(&b.baseline) {
        Ordering::Equal => a.bbox.x0.total_cmp(&b.bbox.x0),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<PositionedSpan> = Vec::new();
    let mut current_baseline: Option<f32> = None;
    let mut current_right = f32::MIN;

    for span in spans {
        let same_line = current_baseline.is_some_and(|y| {
            (span.baseline - y).abs() <= span.font_size * LINE_TOLERANCE
                && span.bbox.x0 - current_right <= span.font_size * COLUMN_GAP
        });

        if !same_line {
            if let Some(line) = TextLine::from_spans(std::mem::take(&mut current)) {
                lines.push(line);
            }
            current_baseline = Some(span.baseline);
            current_right = f32::MIN;
        }

        current_right = current_right.max(span.bbox.x1);
        current.push(span);
    }

    if let Some(line) = TextLine::from_spans(current) {
        lines.push(line);
    }

    lines
}

/// Group lines into blocks on spacing, font size and indentation changes.
pub(crate) fn group_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = average_line_spacing(&lines);

    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                if let Some(block) = TextBlock::from_lines(std::mem::take(&mut current)) {
                    blocks.push(block);
                }
            }
        }
        current.push(line);
    }

    if let Some(block) = TextBlock::from_lines(current) {
        blocks.push(block);
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].baseline - w[0].baseline).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return DEFAULT_LINE_SPACING;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (curr.baseline - prev.baseline).abs();
    if spacing > avg_spacing * BLOCK_SPACING_FACTOR {
        return true;
    }

    if (prev.font_size - curr.font_size).abs() > BLOCK_FONT_DELTA {
        return true;
    }

    (prev.left() - curr.left()).abs() > BLOCK_INDENT_DELTA
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, baseline: f32, size: f32) -> PositionedSpan {
        let width = text.chars().count() as f32 * size * 0.5;
        PositionedSpan {
            text: text.to_string(),
            bbox: BoundingBox::new(x, baseline - 0.8 * size, x + width, baseline + 0.2 * size),
            baseline,
            font_size: size,
        }
    }

    #[test]
    fn test_group_lines_joins_shared_baseline() {
        let lines = group_lines(vec![
            span("World", 40.0, 100.5, 10.0),
            span("Hello ", 10.0, 100.0, 10.0),
            span("Next", 10.0, 114.0, 10.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello World");
        assert_eq!(lines[1].text(), "Next");
        assert_eq!(lines[0].bbox.x0, 10.0);
    }

    #[test]
    fn test_group_lines_orders_spans_by_x_within_line() {
        let lines = group_lines(vec![
            span("Hello ", 10.0, 100.5, 10.0),
            span("World", 40.0, 100.0, 10.0),
        ]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello World");
        assert_eq!(lines[0].baseline, 100.5);
    }

    #[test]
    fn test_group_lines_splits_columns() {
        let lines = group_lines(vec![
            span("left", 10.0, 100.0, 10.0),
            span("right", 300.0, 100.0, 10.0),
        ]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_group_lines_empty() {
        assert!(group_lines(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_blocks_on_spacing() {
        let lines = group_lines(vec![
            span("one", 10.0, 100.0, 10.0),
            span("two", 10.0, 112.0, 10.0),
            span("three", 10.0, 124.0, 10.0),
            span("far", 10.0, 200.0, 10.0),
        ]);
        let blocks = group_blocks(lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "one\ntwo\nthree");
        assert_eq!(blocks[0].bbox.y0, 92.0);
        assert_eq!(blocks[0].bbox.y1, 126.0);
    }

    #[test]
    fn test_group_blocks_on_font_change() {
        let lines = group_lines(vec![
            span("Title", 10.0, 100.0, 18.0),
            span("body", 10.0, 118.0, 10.0),
            span("body", 10.0, 130.0, 10.0),
        ]);
        assert_eq!(group_blocks(lines).len(), 2);
    }

    #[test]
    fn test_block_fragment_normalizes_newlines() {
        let frags = fragments(
            vec![span("first", 10.0, 100.0, 10.0), span("second", 10.0, 112.0, 10.0)],
            Granularity::Block,
        );
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "first second");
    }

    #[test]
    fn test_line_fragments_in_top_down_order() {
        let frags = fragments(
            vec![span("bottom", 10.0, 300.0, 10.0), span("top", 10.0, 50.0, 10.0)],
            Granularity::Line,
        );
        let texts: Vec<&str> = frags.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["top", "bottom"]);
    }
}
