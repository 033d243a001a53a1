//! Pagination engine.
//!
//! Streams flight records into fixed-height logbook pages. Every page ends with
//! a three-line footer (this page, previous pages, grand total) and a page
//! label. Page breaks split one output into several physical logbooks: when the
//! page that just finished matches the next threshold, a blank page is inserted
//! and numbering restarts at 1.
//!
//! The engine does no drawing itself. It drives a [`PageSink`], which the PDF
//! renderer implements and tests replace with a recorder.

use tracing::{debug, trace};

use crate::record::FlightRecord;
use crate::totals::TotalsRecord;

/// Body rows on one logbook page.
pub const DEFAULT_PAGE_CAPACITY: usize = 23;

/// Ordered page-number thresholds, consumed front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBreaks {
    thresholds: Vec<u32>,
    cursor: usize,
}

impl PageBreaks {
    /// Create a queue from thresholds in the order they should fire.
    #[must_use]
    pub fn new(thresholds: Vec<u32>) -> Self {
        Self {
            thresholds,
            cursor: 0,
        }
    }

    /// The next threshold, if any remain.
    #[must_use]
    pub fn peek(&self) -> Option<u32> {
        self.thresholds.get(self.cursor).copied()
    }

    /// Consume the head if it equals `page`. Returns whether it did.
    pub fn take_if(&mut self, page: u32) -> bool {
        if self.peek() == Some(page) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Thresholds not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &[u32] {
        &self.thresholds[self.cursor..]
    }
}

impl From<Vec<u32>> for PageBreaks {
    fn from(thresholds: Vec<u32>) -> Self {
        Self::new(thresholds)
    }
}

/// Totals printed at the bottom of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer<'a> {
    /// Sum of the rows on this page.
    pub page: &'a TotalsRecord,
    /// Sum of all earlier pages.
    pub previous: &'a TotalsRecord,
    /// Sum of everything up to and including this page.
    pub grand: &'a TotalsRecord,
    /// Logbook owner, printed in the certification block.
    pub owner: &'a str,
}

/// Receiver of the page events produced by [`paginate`].
pub trait PageSink {
    /// Error produced by the sink.
    type Error;

    /// Start a new physical page and draw its header.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the page cannot be started.
    fn start_page(&mut self) -> Result<(), Self::Error>;

    /// Insert a blank page separating two logbooks.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the page cannot be added.
    fn blank_page(&mut self) -> Result<(), Self::Error>;

    /// Draw a body row. `None` is a filler row on the last page.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the row cannot be drawn.
    fn body_row(&mut self, record: Option<&FlightRecord>, shaded: bool)
        -> Result<(), Self::Error>;

    /// Draw the totals footer.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the footer cannot be drawn.
    fn footer(&mut self, footer: &Footer<'_>) -> Result<(), Self::Error>;

    /// Draw the page number label.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the label cannot be drawn.
    fn page_number(&mut self, number: u32) -> Result<(), Self::Error>;
}

/// Fixed parameters of a pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Body rows per page.
    pub capacity: usize,
    /// Owner's name for the footer.
    pub owner: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PAGE_CAPACITY,
            owner: String::new(),
        }
    }
}

/// What a pagination run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSummary {
    /// Physical pages, including blank separator pages.
    pub physical_pages: u32,
    /// Logbook pages carrying rows and a footer.
    pub logbook_pages: u32,
    /// Blank separator pages inserted by page breaks.
    pub separators: u32,
    /// Records written.
    pub records: usize,
    /// Grand total at the final footer.
    pub grand_total: TotalsRecord,
}

/// Row shading: every third row of a page, counting from 1.
#[must_use]
pub fn is_shaded(position: usize) -> bool {
    position % 3 == 0
}

/// Pagination state for one run.
struct Paginator<'s, S: PageSink> {
    sink: &'s mut S,
    capacity: usize,
    owner: &'s str,
    breaks: PageBreaks,
    /// Rows on the open page.
    row: usize,
    /// Label of the open (or last flushed) page.
    page_number: u32,
    /// False after a full page was flushed and before the next one opens.
    page_open: bool,
    page_total: TotalsRecord,
    previous_total: TotalsRecord,
    grand_total: TotalsRecord,
    summary: PaginationSummary,
}

impl<'s, S: PageSink> Paginator<'s, S> {
    fn new(sink: &'s mut S, settings: &'s PageSettings, breaks: PageBreaks) -> Self {
        Self {
            sink,
            capacity: settings.capacity.max(1),
            owner: &settings.owner,
            breaks,
            row: 0,
            page_number: 1,
            page_open: false,
            page_total: TotalsRecord::zero(),
            previous_total: TotalsRecord::zero(),
            grand_total: TotalsRecord::zero(),
            summary: PaginationSummary {
                physical_pages: 0,
                logbook_pages: 0,
                separators: 0,
                records: 0,
                grand_total: TotalsRecord::zero(),
            },
        }
    }

    fn start_page(&mut self) -> Result<(), S::Error> {
        trace!(page = self.page_number, "starting page");
        self.sink.start_page()?;
        self.summary.physical_pages += 1;
        self.row = 0;
        self.page_open = true;
        Ok(())
    }

    /// Open the page following a flushed one, honoring the break queue.
    fn open_next_page(&mut self) -> Result<(), S::Error> {
        if self.breaks.take_if(self.page_number) {
            debug!(after_page = self.page_number, "logbook break, numbering restarts");
            self.sink.blank_page()?;
            self.summary.physical_pages += 1;
            self.summary.separators += 1;
            self.page_number = 1;
        } else {
            self.page_number += 1;
        }
        self.start_page()
    }

    fn push(&mut self, record: &FlightRecord) -> Result<(), S::Error> {
        if !self.page_open {
            self.open_next_page()?;
        }

        self.row += 1;
        self.page_total = self.page_total.fold(record);
        self.grand_total = self.grand_total.fold(record);
        self.summary.records += 1;
        self.sink.body_row(Some(record), is_shaded(self.row))?;

        if self.row >= self.capacity {
            self.flush()?;
            self.page_open = false;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), S::Error> {
        debug!(
            page = self.page_number,
            rows = self.row,
            total = %self.page_total.times.total,
            "page complete"
        );
        let footer = Footer {
            page: &self.page_total,
            previous: &self.previous_total,
            grand: &self.grand_total,
            owner: self.owner,
        };
        self.sink.footer(&footer)?;
        self.previous_total += self.page_total;
        self.page_total = TotalsRecord::zero();
        self.sink.page_number(self.page_number)?;
        self.summary.logbook_pages += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<PaginationSummary, S::Error> {
        if self.page_open {
            for position in self.row + 1..=self.capacity {
                self.sink.body_row(None, is_shaded(position))?;
            }
            self.flush()?;
        }
        self.summary.grand_total = self.grand_total;
        Ok(self.summary)
    }
}

/// Lay out `records` onto logbook pages through `sink`.
///
/// Records are written in the order given; callers reverse them first if the
/// newest flight should come first. The first page is opened before any record
/// is read, so an empty input still yields one page of blank rows with a zero
/// footer. When the record count is an exact multiple of the capacity, the last
/// full page's footer is the final one.
///
/// # Errors
///
/// Propagates the first error returned by the sink.
pub fn paginate<'r, S, I>(
    records: I,
    settings: &PageSettings,
    breaks: PageBreaks,
    sink: &mut S,
) -> Result<PaginationSummary, S::Error>
where
    S: PageSink,
    I: IntoIterator<Item = &'r FlightRecord>,
{
    let mut paginator = Paginator::new(sink, settings, breaks);
    paginator.start_page()?;
    for record in records {
        paginator.push(record)?;
    }
    paginator.finish()
}
