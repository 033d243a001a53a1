//! Local Excel workbook reader.

use std::path::PathBuf;

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use tracing::debug;

use super::{finish_rows, SourceReader};
use crate::error::{Error, Result};
use crate::record::{column, Cell, SourceRow};

const SECS_PER_DAY: f64 = 86_400.0;

/// Reads a worksheet of a local `.xlsx` (or `.xls`/`.ods`) workbook.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    sheet: String,
    start_row: u32,
}

impl XlsxSource {
    /// Create a reader for `sheet` of the workbook at `path`.
    #[must_use]
    pub fn new(path: PathBuf, sheet: String, start_row: u32) -> Self {
        Self {
            path,
            sheet,
            start_row,
        }
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn read_range(&self) -> Result<Range<Data>> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| Error::source_unavailable(self.origin(), e.to_string()))?;
        workbook.worksheet_range(&self.sheet).map_err(|e| {
            Error::source_unavailable(self.origin(), format!("sheet '{}': {e}", self.sheet))
        })
    }
}

impl SourceReader for XlsxSource {
    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.sheet)
    }

    fn fetch_rows(&self) -> Result<Vec<SourceRow>> {
        let range = self.read_range()?;
        debug!(
            path = %self.path.display(),
            sheet = %self.sheet,
            start = ?range.start(),
            end = ?range.end(),
            "worksheet loaded"
        );
        finish_rows(&self.origin(), rows_from_range(&range, self.start_row))
    }
}

/// Rows from `start_row` (1-based) to the end of the used range, columns
/// `A` to `W`. Positions are absolute, so a used range that does not begin at
/// `A1` is handled.
fn rows_from_range(range: &Range<Data>, start_row: u32) -> Vec<SourceRow> {
    let Some((_, end)) = range.start().zip(range.end()) else {
        return Vec::new();
    };
    let first = start_row.saturating_sub(1);
    let last_column = u32::try_from(column::COUNT).unwrap_or(u32::MAX);

    (first..=end.0)
        .map(|row| {
            let cells = (0..last_column)
                .map(|col| range.get_value((row, col)).map_or(Cell::Empty, to_cell))
                .collect();
            SourceRow::new(row as usize + 1, cells)
        })
        .collect()
}

/// Convert a workbook cell to the text the logbook expects.
///
/// Dates become ISO `YYYY-MM-DD`, times of day `HH:MM` and durations `H:MM`.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::text(format_datetime(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.clone()),
        Data::Error(e) => Cell::text(format!("{e}")),
    }
}

fn format_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    if dt.is_duration() {
        return format_duration(serial);
    }
    if serial < 1.0 {
        return format_time_of_day(serial);
    }
    match dt.as_datetime() {
        Some(when) if serial.fract() == 0.0 => when.format("%Y-%m-%d").to_string(),
        Some(when) => when.format("%Y-%m-%d %H:%M").to_string(),
        None => serial.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_minutes(days: f64) -> u64 {
    (days.max(0.0) * SECS_PER_DAY / 60.0).round() as u64
}

fn format_duration(days: f64) -> String {
    let minutes = rounded_minutes(days);
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn format_time_of_day(fraction: f64) -> String {
    let minutes = rounded_minutes(fraction) % (24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
