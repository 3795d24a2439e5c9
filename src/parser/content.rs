//! Content stream interpretation.
//!
//! Walks a page's operators and records where text is shown and where
//! image XObjects are painted, in top-down page coordinates.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, ImagePlacement};

use super::backend::{decode_text_simple, get_number, resolve, resolve_dict};

/// Form XObjects nested deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 8;

/// TJ adjustments larger than this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Fallback glyph width in thousandths of an em.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Fraction of the font size above the baseline.
const ASCENT: f32 = 0.8;

/// Fraction of the font size below the baseline.
const DESCENT: f32 = 0.2;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub(crate) fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Read a matrix from six numeric operands or array items.
    fn from_objects(objs: &[Object]) -> Option<Self> {
        if objs.len() < 6 {
            return None;
        }
        Some(Self::new(
            get_number(&objs[0])?,
            get_number(&objs[1])?,
            get_number(&objs[2])?,
            get_number(&objs[3])?,
            get_number(&objs[4])?,
            get_number(&objs[5])?,
        ))
    }

    /// `self × other`: apply `self` first, then `other`.
    pub(crate) fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub(crate) fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Maps PDF user space (bottom-up) to top-down page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageFrame {
    /// Left edge of the MediaBox
    pub left: f32,
    /// Top edge of the MediaBox
    pub top: f32,
}

impl PageFrame {
    pub(crate) fn from_media_box(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            left: llx.min(urx),
            top: lly.max(ury),
        }
    }

    /// US Letter.
    pub(crate) fn letter() -> Self {
        Self::from_media_box(0.0, 0.0, 612.0, 792.0)
    }

    fn to_page(self, (x, y): (f32, f32)) -> (f32, f32) {
        (x - self.left, self.top - y)
    }
}

/// A run of text from one show operator, positioned on the page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionedSpan {
    pub text: String,
    pub bbox: BoundingBox,
    /// Baseline `y` in page space
    pub baseline: f32,
    /// Effective font size in page units
    pub font_size: f32,
}

/// Everything the interpreter found on one page.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageContent {
    pub spans: Vec<PositionedSpan>,
    pub images: Vec<ImagePlacement>,
}

/// Widths of a simple font, in thousandths of an em.
#[derive(Debug, Clone)]
struct FontMetrics {
    first_char: u32,
    widths: Vec<f32>,
    /// Bytes per character code (2 for Type0 fonts)
    code_len: usize,
    default_width: f32,
}

impl FontMetrics {
    fn from_dict(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let is_type0 = font
            .get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            .map(|n| n == b"Type0")
            .unwrap_or(false);

        if is_type0 {
            return Self {
                first_char: 0,
                widths: Vec::new(),
                code_len: 2,
                default_width: 1000.0,
            };
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(get_number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);
        let widths = font
            .get(b"Widths")
            .ok()
            .map(|w| resolve(doc, w))
            .and_then(|w| w.as_array().ok())
            .map(|arr| arr.iter().map(|o| get_number(o).unwrap_or(0.0)).collect())
            .unwrap_or_default();

        Self {
            first_char,
            widths,
            code_len: 1,
            default_width: DEFAULT_GLYPH_WIDTH,
        }
    }

    /// Advance of a byte string, in thousandths of an em.
    fn advance(&self, bytes: &[u8]) -> f32 {
        if self.code_len == 2 {
            return bytes.len().div_ceil(2) as f32 * self.default_width;
        }
        bytes
            .iter()
            .map(|&b| {
                (b as u32)
                    .checked_sub(self.first_char)
                    .and_then(|i| self.widths.get(i as usize))
                    .copied()
                    .filter(|w| *w > 0.0)
                    .unwrap_or(self.default_width)
            })
            .sum()
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            code_len: 1,
            default_width: DEFAULT_GLYPH_WIDTH,
        }
    }
}

/// Graphics state saved and restored by `q` / `Q`.
#[derive(Debug, Clone)]
struct GraphicsState<'a> {
    ctm: Matrix,
    font: Option<&'a Dictionary>,
    metrics: FontMetrics,
    font_size: f32,
    leading: f32,
    /// Horizontal scaling as a fraction (Tz / 100)
    horizontal_scale: f32,
}

impl Default for GraphicsState<'_> {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            metrics: FontMetrics::default(),
            font_size: 12.0,
            leading: 0.0,
            horizontal_scale: 1.0,
        }
    }
}

/// Interprets page content streams into positioned spans and images.
pub(crate) struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    frame: PageFrame,
    output: PageContent,
}

impl<'a> ContentInterpreter<'a> {
    pub(crate) fn new(doc: &'a LopdfDocument, frame: PageFrame) -> Self {
        Self {
            doc,
            frame,
            output: PageContent::default(),
        }
    }

    /// Interpret a page's content and return what was found.
    pub(crate) fn interpret(
        mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
    ) -> Result<PageContent> {
        let state = GraphicsState::default();
        self.run(content, resources, state, 0)?;
        Ok(self.output)
    }

    fn run(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        initial: GraphicsState<'a>,
        depth: usize,
    ) -> Result<()> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut gs = initial;
        let mut stack: Vec<GraphicsState<'a>> = Vec::new();
        let mut text_matrix = Matrix::IDENTITY;
        let mut line_matrix = Matrix::IDENTITY;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(gs.clone()),
                "Q" => match stack.pop() {
                    Some(saved) => gs = saved,
                    None => log::debug!("unbalanced Q operator"),
                },
                "cm" => {
                    if let Some(m) = Matrix::from_objects(operands) {
                        gs.ctm = m.then(&gs.ctm);
                    }
                }
                "BT" => {
                    text_matrix = Matrix::IDENTITY;
                    line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            gs.font = self.lookup_font(resources, name);
                            gs.metrics = gs
                                .font
                                .map(|f| FontMetrics::from_dict(self.doc, f))
                                .unwrap_or_default();
                        }
                        gs.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(tl) = operands.first().and_then(get_number) {
                        gs.leading = tl;
                    }
                }
                "Tz" => {
                    if let Some(tz) = operands.first().and_then(get_number) {
                        gs.horizontal_scale = tz / 100.0;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            gs.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).then(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_objects(operands) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix = Matrix::translation(0.0, -gs.leading).then(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show_strings(&gs, &mut text_matrix, &[ShowItem::Bytes(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(arr)) = operands.first() {
                        let items: Vec<ShowItem> = arr
                            .iter()
                            .filter_map(|item| match item {
                                Object::String(bytes, _) => Some(ShowItem::Bytes(bytes)),
                                other => get_number(other).map(ShowItem::Adjust),
                            })
                            .collect();
                        self.show_strings(&gs, &mut text_matrix, &items);
                    }
                }
                "'" | "\"" => {
                    line_matrix = Matrix::translation(0.0, -gs.leading).then(&line_matrix);
                    text_matrix = line_matrix;
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(idx) {
                        self.show_strings(&gs, &mut text_matrix, &[ShowItem::Bytes(bytes)]);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.paint_xobject(resources, name, &gs, depth)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn lookup_font(&self, resources: Option<&'a Dictionary>, name: &[u8]) -> Option<&'a Dictionary> {
        let fonts = resources?.get(b"Font").ok()?;
        let fonts = resolve_dict(self.doc, fonts)?;
        resolve_dict(self.doc, fonts.get(name).ok()?)
    }

    fn decode(&self, font: Option<&'a Dictionary>, bytes: &[u8]) -> String {
        if let Some(dict) = font {
            if let Ok(enc) = dict.get_font_encoding(self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Show a sequence of strings and kerning adjustments as one span.
    fn show_strings(&mut self, gs: &GraphicsState<'a>, text_matrix: &mut Matrix, items: &[ShowItem]) {
        let metrics = &gs.metrics;
        let start = *text_matrix;
        let mut text = String::new();
        let mut advance = 0.0f32;

        for item in items {
            match item {
                ShowItem::Bytes(bytes) => {
                    text.push_str(&self.decode(gs.font, bytes));
                    advance += metrics.advance(bytes) / 1000.0 * gs.font_size * gs.horizontal_scale;
                }
                ShowItem::Adjust(n) => {
                    if -n > TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    advance -= n / 1000.0 * gs.font_size * gs.horizontal_scale;
                }
            }
        }

        *text_matrix = Matrix::translation(advance, 0.0).then(text_matrix);

        if text.trim().is_empty() {
            return;
        }

        let render = start.then(&gs.ctm);
        let size = gs.font_size;
        let corners = [
            (0.0, -DESCENT * size),
            (advance, -DESCENT * size),
            (advance, ASCENT * size),
            (0.0, ASCENT * size),
        ];
        let frame = self.frame;
        let bbox = BoundingBox::from_points(
            corners
                .iter()
                .map(|&(x, y)| frame.to_page(render.apply(x, y))),
        );
        let (_, baseline) = frame.to_page(render.apply(0.0, 0.0));

        if let Some(bbox) = bbox {
            self.output.spans.push(PositionedSpan {
                text,
                bbox,
                baseline,
                font_size: size * render.vertical_scale(),
            });
        }
    }

    fn paint_xobject(
        &mut self,
        resources: Option<&'a Dictionary>,
        name: &[u8],
        gs: &GraphicsState<'a>,
        depth: usize,
    ) -> Result<()> {
        let Some(xobjects) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| resolve_dict(self.doc, x))
        else {
            log::debug!("Do {} without XObject resources", String::from_utf8_lossy(name));
            return Ok(());
        };

        let Some(id) = xobjects.get(name).ok().and_then(|o| o.as_reference().ok()) else {
            return Ok(());
        };
        let Ok(Object::Stream(stream)) = self.doc.get_object(id) else {
            return Ok(());
        };

        match stream.dict.get(b"Subtype").ok().and_then(|s| s.as_name().ok()) {
            Some(b"Image") => self.place_image(id, &gs.ctm),
            Some(b"Form") => {
                if depth >= MAX_FORM_DEPTH {
                    log::warn!("Form XObject nesting deeper than {}, skipped", MAX_FORM_DEPTH);
                    return Ok(());
                }
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| m.as_array().ok())
                    .and_then(|arr| Matrix::from_objects(arr))
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| resolve_dict(self.doc, r))
                    .or(resources);
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());

                let mut inner = gs.clone();
                inner.ctm = form_matrix.then(&gs.ctm);
                self.run(&data, form_resources, inner, depth + 1)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// An image XObject fills the unit square of the current CTM.
    fn place_image(&mut self, id: ObjectId, ctm: &Matrix) {
        let frame = self.frame;
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        if let Some(bbox) = BoundingBox::from_points(
            corners
                .iter()
                .map(|&(x, y)| frame.to_page(ctm.apply(x, y))),
        ) {
            self.output.images.push(ImagePlacement {
                id: id.into(),
                bbox,
            });
        }
    }
}

/// One element of a text-showing operator.
enum ShowItem<'b> {
    Bytes(&'b [u8]),
    Adjust(f32),
}
