//! `printpdf` canvas.

use std::fmt;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Polygon, Rgb,
};
use tracing::warn;

use super::Canvas;
use crate::error::{Error, Result};
use crate::font::{self, Weight};
use crate::layout::{self, Align, DrawCell, MM_PER_PT};

/// Stroke width of cell borders, in points.
const BORDER_THICKNESS: f32 = 0.57;
/// Inset of left-aligned text from the cell edge, in mm.
const TEXT_INSET: f32 = 1.0;
/// Line spacing as a multiple of the font size.
const LINE_SPACING: f32 = 1.15;

/// A4 landscape PDF with the embedded DejaVu Sans Condensed faces.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: Option<PdfLayerReference>,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl fmt::Debug for PdfCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfCanvas")
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

fn grey(level: u8) -> Color {
    let v = f32::from(level) / 255.0;
    Color::Rgb(Rgb::new(v, v, v, None))
}

fn point(x: f32, y: f32) -> (Point, bool) {
    // Layout measures from the top edge; PDF from the bottom.
    (Point::new(Mm(x), Mm(layout::PAGE_HEIGHT - y)), false)
}

impl PdfCanvas {
    /// Create an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the embedded fonts cannot be registered.
    pub fn new(title: &str) -> Result<Self> {
        let doc = PdfDocument::empty(title);
        let regular = doc
            .add_external_font(Weight::Regular.data())
            .map_err(|e| Error::render(format!("regular font: {e}")))?;
        let bold = doc
            .add_external_font(Weight::Bold.data())
            .map_err(|e| Error::render(format!("bold font: {e}")))?;
        Ok(Self {
            doc,
            layer: None,
            regular,
            bold,
            pages: 0,
        })
    }

    /// Pages added so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn fill_rect(layer: &PdfLayerReference, cell: &DrawCell, level: u8) {
        let ring = vec![
            point(cell.x, cell.y),
            point(cell.x + cell.width, cell.y),
            point(cell.x + cell.width, cell.y + cell.height),
            point(cell.x, cell.y + cell.height),
        ];
        layer.set_fill_color(grey(level));
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_border(layer: &PdfLayerReference, cell: &DrawCell) {
        let (x0, y0) = (cell.x, cell.y);
        let (x1, y1) = (cell.x + cell.width, cell.y + cell.height);
        layer.set_outline_color(grey(0));
        layer.set_outline_thickness(BORDER_THICKNESS);

        if cell.border.is_full() {
            layer.add_line(Line {
                points: vec![point(x0, y0), point(x1, y0), point(x1, y1), point(x0, y1)],
                is_closed: true,
            });
            return;
        }

        let edges = [
            (cell.border.left, (x0, y0), (x0, y1)),
            (cell.border.top, (x0, y0), (x1, y0)),
            (cell.border.right, (x1, y0), (x1, y1)),
            (cell.border.bottom, (x0, y1), (x1, y1)),
        ];
        for (_, from, to) in edges.into_iter().filter(|(on, _, _)| *on) {
            layer.add_line(Line {
                points: vec![point(from.0, from.1), point(to.0, to.1)],
                is_closed: false,
            });
        }
    }

    fn write_text(&self, layer: &PdfLayerReference, cell: &DrawCell) {
        let font_size = cell.font_size;
        let weight = cell.weight();
        let lines = layout::wrap_text(&cell.text, cell.width - TEXT_INSET, font_size, weight);
        if lines.is_empty() {
            return;
        }
        let missing = font::missing_glyphs(&cell.text, weight);
        if !missing.is_empty() {
            warn!(text = %cell.text, ?missing, "characters not covered by the font");
        }
        let font = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        };
        let line_height = font_size * MM_PER_PT * LINE_SPACING;
        #[allow(clippy::cast_precision_loss)]
        let block = line_height * lines.len() as f32;
        // Cap height sits about 0.72 em above the baseline.
        let ascent = font_size * MM_PER_PT * 0.72;
        let first_baseline = cell.y + (cell.height - block) / 2.0 + (line_height + ascent) / 2.0;

        layer.set_fill_color(grey(0));
        let mut baseline = first_baseline;
        for line in &lines {
            let x = match cell.align {
                Align::Left => cell.x + TEXT_INSET,
                Align::Center => {
                    let width = layout::text_width(line, font_size, weight);
                    cell.x + (cell.width - width).max(0.0) / 2.0
                }
            };
            layer.use_text(
                line.as_str(),
                font_size,
                Mm(x),
                Mm(layout::PAGE_HEIGHT - baseline),
                font,
            );
            baseline += line_height;
        }
    }
}

impl Canvas for PdfCanvas {
    fn add_page(&mut self) -> Result<()> {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(layout::PAGE_WIDTH),
            Mm(layout::PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        Ok(())
    }

    fn draw_cell(&mut self, cell: &DrawCell) -> Result<()> {
        let layer = self
            .layer
            .clone()
            .ok_or_else(|| Error::render("cell drawn before the first page"))?;

        if let Some(shade) = cell.fill {
            Self::fill_rect(&layer, cell, shade.grey());
        }
        if cell.border != layout::Border::NONE {
            Self::stroke_border(&layer, cell);
        }
        if !cell.text.is_empty() {
            self.write_text(&layer, cell);
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.pages == 0 {
            return Err(Error::render("document has no pages"));
        }
        self.doc
            .save_to_bytes()
            .map_err(|e| Error::render(format!("PDF encoding failed: {e}")))
    }
}
