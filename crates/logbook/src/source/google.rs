//! Google Sheets v4 reader.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{finish_rows, SourceReader, LAST_COLUMN};
use crate::error::{Error, Result};
use crate::record::{column, Cell, SourceRow};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads a sheet through the public values endpoint with an API key.
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    api_key: String,
    spreadsheet_id: String,
    sheet: String,
    start_row: u32,
}

/// Body of a `spreadsheets.values.get` response.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheetsSource {
    /// Create a reader for `sheet` of `spreadsheet_id`.
    #[must_use]
    pub fn new(api_key: String, spreadsheet_id: String, sheet: String, start_row: u32) -> Self {
        Self {
            api_key,
            spreadsheet_id,
            sheet,
            start_row,
        }
    }

    /// The A1 range requested, e.g. `Flights!A20:W`.
    #[must_use]
    pub fn range(&self) -> String {
        format!("{}!A{}:{LAST_COLUMN}", self.sheet, self.start_row)
    }

    /// Full request URL including the API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] if the URL cannot be built.
    pub fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| Error::source_unavailable(&self.spreadsheet_id, e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| Error::source_unavailable(&self.spreadsheet_id, "invalid base URL"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&self.range());
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn fetch(&self) -> Result<ValueRange> {
        let url = self.values_url()?;
        debug!(spreadsheet = %self.spreadsheet_id, range = %self.range(), "requesting sheet values");

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::source_unavailable(&self.spreadsheet_id, e.to_string()))?;

        client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<ValueRange>)
            .map_err(|e| {
                // reqwest errors carry the URL, which includes the key.
                Error::source_unavailable(&self.spreadsheet_id, e.without_url().to_string())
            })
    }
}

impl SourceReader for GoogleSheetsSource {
    fn describe(&self) -> String {
        format!("spreadsheet {} [{}]", self.spreadsheet_id, self.range())
    }

    fn fetch_rows(&self) -> Result<Vec<SourceRow>> {
        let body = self.fetch()?;
        finish_rows(&self.spreadsheet_id, rows_from_values(body, self.start_row))
    }
}

/// Number each returned row from `start_row`.
///
/// The API omits trailing empty cells, so rows are padded to columns `A` to
/// `W` like the workbook reader delivers them.
fn rows_from_values(body: ValueRange, start_row: u32) -> Vec<SourceRow> {
    let first = start_row as usize;
    body.values
        .into_iter()
        .enumerate()
        .map(|(i, values)| {
            let mut cells: Vec<Cell> = values.into_iter().map(to_cell).collect();
            if cells.len() < column::COUNT {
                cells.resize(column::COUNT, Cell::Empty);
            }
            SourceRow::new(first + i, cells)
        })
        .collect()
}

/// Formatted values arrive as strings; other JSON types are kept for sheets
/// requested with unformatted values.
fn to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::String(s) => Cell::text(s),
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => n.as_f64().map_or(Cell::Empty, Cell::Number),
        other => Cell::text(other.to_string()),
    }
}
