//! Flight records and the row decoder.
//!
//! A source row is a positional list of cells laid out like the EASA paper
//! logbook. [`FlightRecord::from_row`] checks each column against its expected
//! kind and reports the first offending column as [`Error::MalformedRow`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::Duration;

/// One spreadsheet cell as delivered by a source reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Nothing in the cell.
    #[default]
    Empty,
    /// Text, including formatted dates and times.
    Text(String),
    /// A raw numeric value.
    Number(f64),
    /// A boolean value.
    Bool(bool),
}

impl Cell {
    /// Build a text cell, mapping the empty string to [`Cell::Empty`].
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// Short name of the cell kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
        }
    }

    /// True when the cell is empty or holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A row fetched from a source, with its 1-based row number in the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceRow {
    /// Sheet row number, for error reporting.
    pub number: usize,
    /// Cells in column order.
    pub cells: Vec<Cell>,
}

impl SourceRow {
    /// Create a row.
    #[must_use]
    pub fn new(number: usize, cells: Vec<Cell>) -> Self {
        Self { number, cells }
    }

    /// True when every cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

/// Departure or arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Airport code.
    pub place: String,
    /// Block time as written in the sheet.
    pub time: String,
}

/// Aircraft flown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Type, e.g. `C152`.
    pub model: String,
    /// Registration mark.
    pub registration: String,
}

/// The duration columns of a logbook line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Times {
    /// Single-pilot (single-engine) time.
    pub single_pilot: Duration,
    /// Multi-pilot (multi-engine) time.
    pub multi_pilot: Duration,
    /// Multi-crew cooperation time.
    pub multi_crew: Duration,
    /// Night time.
    pub night: Duration,
    /// Instrument time.
    pub instrument: Duration,
    /// Pilot-in-command time.
    pub pic: Duration,
    /// Co-pilot time.
    pub copilot: Duration,
    /// Dual instruction received.
    pub dual: Duration,
    /// Instructor time.
    pub instructor: Duration,
    /// Total time of flight.
    pub total: Duration,
}

/// Landing counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landings {
    /// Day landings.
    pub day: u32,
    /// Night landings.
    pub night: u32,
}

/// Flight simulator (FSTD) session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimSession {
    /// Device type.
    pub name: String,
    /// Session time.
    pub time: Duration,
}

/// One line of the logbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Date as written in the sheet.
    pub date: String,
    /// Departure place and time.
    pub departure: Place,
    /// Arrival place and time.
    pub arrival: Place,
    /// Aircraft type and registration.
    pub aircraft: Aircraft,
    /// Flight time columns.
    pub times: Times,
    /// Landing counts.
    pub landings: Landings,
    /// Simulator session.
    pub sim: SimSession,
    /// Name of the pilot in command.
    pub pic_name: String,
    /// Remarks and endorsements.
    pub remarks: String,
}

/// Column positions in a source row.
#[allow(missing_docs)]
pub mod column {
    pub const DATE: usize = 0;
    pub const DEPARTURE_PLACE: usize = 1;
    pub const DEPARTURE_TIME: usize = 2;
    pub const ARRIVAL_PLACE: usize = 3;
    pub const ARRIVAL_TIME: usize = 4;
    pub const AIRCRAFT_MODEL: usize = 5;
    pub const AIRCRAFT_REG: usize = 6;
    pub const SINGLE_PILOT: usize = 7;
    pub const MULTI_PILOT: usize = 8;
    pub const MULTI_CREW: usize = 9;
    pub const TOTAL: usize = 10;
    pub const LANDINGS_DAY: usize = 11;
    pub const LANDINGS_NIGHT: usize = 12;
    pub const NIGHT: usize = 13;
    pub const INSTRUMENT: usize = 14;
    pub const PIC: usize = 15;
    pub const COPILOT: usize = 16;
    pub const DUAL: usize = 17;
    pub const INSTRUCTOR: usize = 18;
    pub const SIM_NAME: usize = 19;
    pub const SIM_TIME: usize = 20;
    pub const PIC_NAME: usize = 21;
    pub const REMARKS: usize = 22;

    /// Number of columns a source must deliver (`A` to `W`).
    pub const COUNT: usize = 23;
}

const EXPECT_TEXT: &str = "text";
const EXPECT_DURATION: &str = "duration text (H:MM)";
const EXPECT_COUNT: &str = "landing count";

/// Positional decoder over one row.
struct RowDecoder<'a> {
    row: &'a SourceRow,
}

impl<'a> RowDecoder<'a> {
    fn cell(&self, column: usize, expected: &'static str) -> Result<&'a Cell> {
        self.row
            .cells
            .get(column)
            .ok_or_else(|| Error::malformed_row(self.row.number, column, expected, "missing"))
    }

    fn text(&self, column: usize) -> Result<String> {
        Ok(self.cell(column, EXPECT_TEXT)?.to_string())
    }

    fn duration_token(&self, column: usize) -> Result<&'a str> {
        match self.cell(column, EXPECT_DURATION)? {
            Cell::Empty => Ok(""),
            Cell::Text(s) => Ok(s.as_str()),
            other => Err(Error::malformed_row(
                self.row.number,
                column,
                EXPECT_DURATION,
                other.kind(),
            )),
        }
    }

    fn duration(&self, column: usize) -> Result<Duration> {
        self.duration_token(column).map(parse_duration_cell)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn count(&self, column: usize) -> Result<u32> {
        let cell = self.cell(column, EXPECT_COUNT)?;
        match cell {
            Cell::Empty => Ok(0),
            Cell::Text(s) => Ok(s.trim().parse().unwrap_or(0)),
            Cell::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) => {
                Ok(*n as u32)
            }
            other => Err(Error::malformed_row(
                self.row.number,
                column,
                EXPECT_COUNT,
                other.to_string(),
            )),
        }
    }
}

/// Repair a sheet quirk where `0:MM` is exported as `:MM`, then parse leniently.
fn parse_duration_cell(token: &str) -> Duration {
    let token = token.trim();
    if token.starts_with(':') {
        Duration::parse_lenient(&format!("0{token}"))
    } else {
        Duration::parse_lenient(token)
    }
}

impl FlightRecord {
    /// Decode a source row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRow`] when a required column is missing or holds
    /// a value of the wrong kind. A missing remarks column is not an error.
    pub fn from_row(row: &SourceRow) -> Result<Self> {
        use column as c;

        let d = RowDecoder { row };

        let date = d.text(c::DATE)?;
        let departure = Place {
            place: d.text(c::DEPARTURE_PLACE)?,
            time: d.text(c::DEPARTURE_TIME)?,
        };
        let arrival = Place {
            place: d.text(c::ARRIVAL_PLACE)?,
            time: d.text(c::ARRIVAL_TIME)?,
        };
        let aircraft = Aircraft {
            model: d.text(c::AIRCRAFT_MODEL)?,
            registration: d.text(c::AIRCRAFT_REG)?,
        };

        let single_pilot = d.duration(c::SINGLE_PILOT)?;
        // Multi-pilot time only counts when the multi-crew column is empty.
        let multi_pilot_token = d.duration_token(c::MULTI_PILOT)?;
        let multi_crew_token = d.duration_token(c::MULTI_CREW)?;
        let multi_pilot =
            if multi_crew_token.trim().is_empty() && !multi_pilot_token.trim().is_empty() {
                parse_duration_cell(multi_pilot_token)
            } else {
                Duration::ZERO
            };
        let multi_crew = parse_duration_cell(multi_crew_token);
        let total = d.duration(c::TOTAL)?;

        let landings = Landings {
            day: d.count(c::LANDINGS_DAY)?,
            night: d.count(c::LANDINGS_NIGHT)?,
        };

        let times = Times {
            single_pilot,
            multi_pilot,
            multi_crew,
            night: d.duration(c::NIGHT)?,
            instrument: d.duration(c::INSTRUMENT)?,
            pic: d.duration(c::PIC)?,
            copilot: d.duration(c::COPILOT)?,
            dual: d.duration(c::DUAL)?,
            instructor: d.duration(c::INSTRUCTOR)?,
            total,
        };

        let sim = SimSession {
            name: d.text(c::SIM_NAME)?,
            time: d.duration(c::SIM_TIME)?,
        };

        Ok(Self {
            date,
            departure,
            arrival,
            aircraft,
            times,
            landings,
            sim,
            pic_name: d.text(c::PIC_NAME)?,
            remarks: row
                .cells
                .get(c::REMARKS)
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    }
}

/// Decode every row, stopping at the first malformed one.
///
/// # Errors
///
/// Returns the first [`Error::MalformedRow`] encountered.
pub fn parse_rows(rows: &[SourceRow]) -> Result<Vec<FlightRecord>> {
    rows.iter().map(FlightRecord::from_row).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A complete row with every column filled in.
    pub(crate) fn sample_row(number: usize) -> SourceRow {
        let cells = [
            "2023-05-01", "EGLL", "08:00", "LFPG", "09:15", "A320", "G-ABCD", "", "", "1:15",
            "1:15", "1", "0", "", "0:30", "1:15", "", "", "", "", "", "SELF", "Line check",
        ]
        .into_iter()
        .map(Cell::text)
        .collect();
        SourceRow::new(number, cells)
    }

    fn with_cell(mut row: SourceRow, column: usize, cell: Cell) -> SourceRow {
        row.cells[column] = cell;
        row
    }

    #[test]
    fn test_parse_complete_row() {
        let record = FlightRecord::from_row(&sample_row(5)).unwrap();

        assert_eq!(record.date, "2023-05-01");
        assert_eq!(record.departure.place, "EGLL");
        assert_eq!(record.departure.time, "08:00");
        assert_eq!(record.arrival.place, "LFPG");
        assert_eq!(record.aircraft.model, "A320");
        assert_eq!(record.aircraft.registration, "G-ABCD");
        assert_eq!(record.times.multi_crew, Duration::from_hm(1, 15));
        assert_eq!(record.times.total, Duration::from_hm(1, 15));
        assert_eq!(record.times.instrument, Duration::from_hm(0, 30));
        assert_eq!(record.landings, Landings { day: 1, night: 0 });
        assert_eq!(record.pic_name, "SELF");
        assert_eq!(record.remarks, "Line check");
    }

    #[test]
    fn test_missing_remarks_is_empty() {
        let mut row = sample_row(2);
        row.cells.truncate(column::REMARKS);
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.remarks, "");
    }

    #[test]
    fn test_missing_required_column() {
        let mut row = sample_row(7);
        row.cells.truncate(column::PIC_NAME);
        let err = FlightRecord::from_row(&row).unwrap_err();
        match err {
            Error::MalformedRow {
                row,
                column: col,
                found,
                ..
            } => {
                assert_eq!(row, 7);
                assert_eq!(col, column::PIC_NAME);
                assert_eq!(found, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_duration_is_rejected() {
        let row = with_cell(sample_row(3), column::NIGHT, Cell::Number(0.5));
        let err = FlightRecord::from_row(&row).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRow {
                column: column::NIGHT,
                ..
            }
        ));
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn test_multi_pilot_taken_when_multi_crew_empty() {
        let row = with_cell(sample_row(1), column::MULTI_CREW, Cell::Empty);
        let row = with_cell(row, column::MULTI_PILOT, Cell::text("2:00"));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.times.multi_pilot, Duration::from_hm(2, 0));
        assert_eq!(record.times.multi_crew, Duration::ZERO);
    }

    #[test]
    fn test_multi_pilot_ignored_when_multi_crew_set() {
        let row = with_cell(sample_row(1), column::MULTI_PILOT, Cell::text("2:00"));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.times.multi_pilot, Duration::ZERO);
        assert_eq!(record.times.multi_crew, Duration::from_hm(1, 15));
    }

    #[test]
    fn test_multi_pilot_zero_when_both_empty() {
        let row = with_cell(sample_row(1), column::MULTI_CREW, Cell::Empty);
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.times.multi_pilot, Duration::ZERO);
        assert_eq!(record.times.multi_crew, Duration::ZERO);
    }

    #[test]
    fn test_leading_colon_is_repaired() {
        let row = with_cell(sample_row(1), column::NIGHT, Cell::text(":45"));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.times.night, Duration::from_hm(0, 45));
    }

    #[test]
    fn test_bad_duration_text_falls_back_to_zero() {
        let row = with_cell(sample_row(1), column::DUAL, Cell::text("n/a"));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.times.dual, Duration::ZERO);
    }

    #[test]
    fn test_landing_counts() {
        let row = with_cell(sample_row(1), column::LANDINGS_DAY, Cell::Number(3.0));
        let row = with_cell(row, column::LANDINGS_NIGHT, Cell::text("x"));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.landings, Landings { day: 3, night: 0 });

        let row = with_cell(sample_row(9), column::LANDINGS_DAY, Cell::Number(-1.0));
        assert!(matches!(
            FlightRecord::from_row(&row),
            Err(Error::MalformedRow {
                row: 9,
                column: column::LANDINGS_DAY,
                ..
            })
        ));
    }

    #[test]
    fn test_numeric_text_columns_are_stringified() {
        let row = with_cell(sample_row(1), column::AIRCRAFT_REG, Cell::Number(1234.0));
        let record = FlightRecord::from_row(&row).unwrap();
        assert_eq!(record.aircraft.registration, "1234");
    }

    #[test]
    fn test_parse_rows_stops_at_first_error() {
        let mut bad = sample_row(11);
        bad.cells.truncate(3);
        let rows = vec![sample_row(10), bad, sample_row(12)];
        let err = parse_rows(&rows).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { row: 11, .. }));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::text(""), Cell::Empty);
    }

    #[test]
    fn test_blank_row() {
        let row = SourceRow::new(1, vec![Cell::Empty, Cell::text("  ")]);
        assert!(row.is_blank());
        assert!(!sample_row(1).is_blank());
    }
}
