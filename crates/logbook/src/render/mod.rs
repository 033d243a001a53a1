//! Drawing logbook pages.
//!
//! [`LogbookWriter`] is the [`PageSink`] used for real exports. It turns page
//! events into [`DrawCell`] commands from [`crate::layout`] and hands them to a
//! [`Canvas`]. The production canvas is [`PdfCanvas`].

mod pdf;

pub use pdf::PdfCanvas;

use tracing::trace;

use crate::error::{Error, Result};
use crate::layout::{self, DrawCell};
use crate::paginate::{Footer, PageSink};
use crate::record::FlightRecord;

/// A page-oriented drawing surface.
pub trait Canvas {
    /// Start a new blank page. Later cells go on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be created.
    fn add_page(&mut self) -> Result<()>;

    /// Draw one cell on the current page.
    ///
    /// # Errors
    ///
    /// Returns an error if no page has been added yet.
    fn draw_cell(&mut self, cell: &DrawCell) -> Result<()>;

    /// Serialize the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Page sink that draws onto a [`Canvas`].
#[derive(Debug)]
pub struct LogbookWriter<C> {
    canvas: C,
    /// Top edge of the next row on the current page.
    cursor: f32,
}

impl<C: Canvas> LogbookWriter<C> {
    /// Wrap a canvas.
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            cursor: layout::BODY_TOP,
        }
    }

    fn draw_all(&mut self, cells: &[DrawCell]) -> Result<()> {
        cells.iter().try_for_each(|cell| self.canvas.draw_cell(cell))
    }

    /// Give back the canvas.
    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Serialize the underlying document.
    ///
    /// # Errors
    ///
    /// Propagates the canvas error.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.canvas.finish()
    }
}

impl<C: Canvas> PageSink for LogbookWriter<C> {
    type Error = Error;

    fn start_page(&mut self) -> Result<()> {
        self.canvas.add_page()?;
        self.draw_all(&layout::header_cells())?;
        self.cursor = layout::BODY_TOP;
        Ok(())
    }

    fn blank_page(&mut self) -> Result<()> {
        trace!("blank separator page");
        self.canvas.add_page()
    }

    fn body_row(&mut self, record: Option<&FlightRecord>, shaded: bool) -> Result<()> {
        self.draw_all(&layout::body_cells(record, shaded, self.cursor))?;
        self.cursor += layout::BODY_ROW_HEIGHT;
        Ok(())
    }

    fn footer(&mut self, footer: &Footer<'_>) -> Result<()> {
        self.draw_all(&layout::footer_block(footer, self.cursor))?;
        self.cursor += layout::FOOTER_HEIGHT;
        Ok(())
    }

    fn page_number(&mut self, number: u32) -> Result<()> {
        self.canvas
            .draw_cell(&layout::page_label(number, self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::tests::flight;
    use crate::paginate::{paginate, PageBreaks, PageSettings};

    /// Canvas that keeps the cells of each page.
    #[derive(Debug, Default)]
    struct PageRecorder {
        pages: Vec<Vec<DrawCell>>,
    }

    impl Canvas for PageRecorder {
        fn add_page(&mut self) -> Result<()> {
            self.pages.push(Vec::new());
            Ok(())
        }

        fn draw_cell(&mut self, cell: &DrawCell) -> Result<()> {
            self.pages
                .last_mut()
                .ok_or_else(|| Error::render("no page"))?
                .push(cell.clone());
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn texts(page: &[DrawCell]) -> Vec<&str> {
        page.iter().map(|c| c.text.as_str()).collect()
    }

    fn run(records: &[FlightRecord], breaks: Vec<u32>) -> PageRecorder {
        let mut writer = LogbookWriter::new(PageRecorder::default());
        let settings = PageSettings {
            capacity: 23,
            owner: "J. Doe".to_string(),
        };
        paginate(records, &settings, PageBreaks::new(breaks), &mut writer).unwrap();
        writer.into_canvas()
    }

    #[test]
    fn test_empty_logbook_page() {
        let canvas = run(&[], vec![]);

        assert_eq!(canvas.pages.len(), 1);
        let page = &canvas.pages[0];
        let texts = texts(page);
        assert!(texts.contains(&"DATE"));
        assert!(texts.contains(&"TOTAL THIS PAGE"));
        assert!(texts.contains(&"TOTAL TIME"));
        assert!(texts.contains(&"J. Doe"));
        assert_eq!(texts.last(), Some(&"page 1"));

        let body_rows = page
            .iter()
            .filter(|c| c.y >= layout::BODY_TOP)
            .filter(|c| (c.height - layout::BODY_ROW_HEIGHT).abs() < f32::EPSILON)
            .count();
        assert_eq!(body_rows, 23 * 23);
    }

    #[test]
    fn test_rows_advance_down_the_page() {
        let records = vec![flight("01/05/2023", 60), flight("02/05/2023", 30)];
        let canvas = run(&records, vec![]);
        let page = &canvas.pages[0];

        let first = page.iter().find(|c| c.text == "01/05/2023").unwrap();
        let second = page.iter().find(|c| c.text == "02/05/2023").unwrap();
        assert!((first.y - layout::BODY_TOP).abs() < f32::EPSILON);
        assert!((second.y - first.y - layout::BODY_ROW_HEIGHT).abs() < 1e-4);

        let footer = page.iter().find(|c| c.text == "TOTAL THIS PAGE").unwrap();
        let expected = layout::BODY_TOP + 23.0 * layout::BODY_ROW_HEIGHT;
        assert!((footer.y - expected).abs() < 1e-3);
        assert!(texts(page).contains(&"1:30"));
    }

    #[test]
    fn test_separator_page_is_blank() {
        let records: Vec<_> = (0..30).map(|i| flight(&format!("d{i}"), 10)).collect();
        let canvas = run(&records, vec![1]);

        assert_eq!(canvas.pages.len(), 3);
        assert!(canvas.pages[1].is_empty());
        assert_eq!(texts(&canvas.pages[0]).last(), Some(&"page 1"));
        assert_eq!(texts(&canvas.pages[2]).last(), Some(&"page 1"));
        assert!(texts(&canvas.pages[2]).contains(&"DATE"));
    }

    #[test]
    fn test_pdf_export_produces_document() {
        let records = vec![flight("01/05/2023", 75)];
        let mut writer = LogbookWriter::new(PdfCanvas::new("Logbook").unwrap());
        let settings = PageSettings::default();
        let summary = paginate(&records, &settings, PageBreaks::default(), &mut writer).unwrap();
        let bytes = writer.finish().unwrap();

        assert_eq!(summary.physical_pages, 1);
        assert!(bytes.starts_with(b"%PDF"));
    }
}
