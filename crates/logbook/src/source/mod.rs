//! Flight data sources.
//!
//! A source delivers raw [`SourceRow`]s; decoding them into flight records is
//! left to [`crate::record`]. Two readers exist: a local Excel workbook and the
//! Google Sheets v4 values API.

mod google;
mod xlsx;

pub use google::GoogleSheetsSource;
pub use xlsx::XlsxSource;

use tracing::info;

use crate::config::{SourceConfig, SourceKind};
use crate::error::{Error, Result};
use crate::record::SourceRow;

/// Last column read from a sheet (`W`).
pub const LAST_COLUMN: &str = "W";

/// Something that can produce the rows of a flight log.
pub trait SourceReader {
    /// Human-readable name of the source, for messages.
    fn describe(&self) -> String;

    /// Fetch every data row starting at the configured row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`] if the source cannot be read and
    /// [`Error::SourceEmpty`] if it holds no rows.
    fn fetch_rows(&self) -> Result<Vec<SourceRow>>;
}

/// Build the reader selected by `config`.
///
/// # Errors
///
/// Returns [`Error::ConfigInvalid`] if a setting the reader needs is missing.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn SourceReader>> {
    match config.kind {
        SourceKind::Xlsx => {
            let path = config
                .file_name
                .clone()
                .ok_or_else(|| Error::config_invalid("source.file_name is not set"))?;
            Ok(Box::new(XlsxSource::new(
                path,
                config.sheet_name.clone(),
                config.start_row,
            )))
        }
        SourceKind::Google => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| Error::config_invalid("source.api_key is not set"))?;
            let spreadsheet_id = config
                .spreadsheet_id
                .clone()
                .ok_or_else(|| Error::config_invalid("source.spreadsheet_id is not set"))?;
            Ok(Box::new(GoogleSheetsSource::new(
                api_key,
                spreadsheet_id,
                config.sheet_name.clone(),
                config.start_row,
            )))
        }
    }
}

/// Drop blank rows, fail when nothing is left.
fn finish_rows(origin: &str, rows: Vec<SourceRow>) -> Result<Vec<SourceRow>> {
    let total = rows.len();
    let rows: Vec<SourceRow> = rows.into_iter().filter(|r| !r.is_blank()).collect();
    if rows.is_empty() {
        return Err(Error::source_empty(origin));
    }
    info!(
        source = origin,
        rows = rows.len(),
        skipped = total - rows.len(),
        "fetched flight rows"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Cell;

    #[test]
    fn test_from_config_xlsx() {
        let config = SourceConfig {
            file_name: Some("book.xlsx".into()),
            ..SourceConfig::default()
        };
        let reader = from_config(&config).unwrap();
        assert!(reader.describe().contains("book.xlsx"));
    }

    #[test]
    fn test_from_config_google() {
        let config = SourceConfig {
            kind: SourceKind::Google,
            api_key: Some("key".to_string()),
            spreadsheet_id: Some("abc123".to_string()),
            ..SourceConfig::default()
        };
        let reader = from_config(&config).unwrap();
        assert!(reader.describe().contains("abc123"));
    }

    #[test]
    fn test_from_config_missing_settings() {
        let err = from_config(&SourceConfig::default()).err().unwrap();
        assert!(err.is_config_error());

        let config = SourceConfig {
            kind: SourceKind::Google,
            api_key: Some("key".to_string()),
            ..SourceConfig::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_finish_rows_skips_blank() {
        let rows = vec![
            SourceRow::new(1, vec![Cell::text("a")]),
            SourceRow::new(2, vec![Cell::Empty]),
            SourceRow::new(3, vec![]),
        ];
        let rows = finish_rows("test", rows).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 1);
    }

    #[test]
    fn test_finish_rows_empty() {
        let rows = vec![SourceRow::new(4, vec![Cell::Empty])];
        assert!(matches!(
            finish_rows("Flights", rows),
            Err(Error::SourceEmpty { .. })
        ));
    }
}
